//! Unit naming: normalization, package prefixes and resource paths.
//!
//! Callers may spell a module as `0x2::coin`, `0x2.coin`, `0x2/coin` or with a
//! fully padded address; all of them normalize to the same [`UnitName`].

use move_core_types::account_address::AccountAddress;
use move_core_types::language_storage::ModuleId;

/// Suffix carried by every compiled module resource.
pub const UNIT_SUFFIX: &str = ".mv";

/// Suffix of a module archive file.
pub const ARCHIVE_SUFFIX: &str = ".mvar";

const SEPARATOR: &str = "::";

/// Canonical name of a compiled unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitName(String);

impl UnitName {
    /// Normalize a raw name using `.`, `/` or `::` separators.
    pub fn parse(raw: &str) -> Self {
        UnitName(normalize(raw))
    }

    pub fn from_module_id(id: &ModuleId) -> Self {
        UnitName(format!(
            "{}{}{}",
            id.address().to_hex_literal(),
            SEPARATOR,
            id.name()
        ))
    }

    /// Name of the unit addressed by a resource path such as `0x2/coin.mv`.
    ///
    /// Returns `None` when the path does not carry the unit suffix.
    pub fn from_resource_path(path: &str) -> Option<Self> {
        let stem = path.strip_suffix(UNIT_SUFFIX)?;
        let stem = stem.trim_start_matches('/');
        if stem.is_empty() {
            return None;
        }
        Some(UnitName::parse(stem))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the last separator, if the name has one.
    pub fn package(&self) -> Option<&str> {
        self.0.rfind(SEPARATOR).map(|idx| &self.0[..idx])
    }

    /// Last segment of the name.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + SEPARATOR.len()..],
            None => &self.0,
        }
    }

    /// Slash-separated path of this unit inside a search root or archive.
    pub fn resource_path(&self) -> String {
        format!("{}{}", self.0.replace(SEPARATOR, "/"), UNIT_SUFFIX)
    }
}

impl std::fmt::Display for UnitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a name or package prefix to `::`-separated canonical form.
pub fn normalize(raw: &str) -> String {
    let flattened = raw.replace(SEPARATOR, "/").replace('.', "/");
    let segments: Vec<String> = flattened
        .split('/')
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(idx, segment)| {
            if idx == 0 {
                canonical_address(segment).unwrap_or_else(|| segment.to_string())
            } else {
                segment.to_string()
            }
        })
        .collect();
    segments.join(SEPARATOR)
}

/// Slash-separated directory path of a package prefix.
pub fn package_path(package: &str) -> String {
    normalize(package).replace(SEPARATOR, "/")
}

/// True when a resource name addresses a compiled unit.
pub fn is_unit_resource(name: &str) -> bool {
    name.ends_with(UNIT_SUFFIX)
}

// Short hex literal for address segments so `0x2` and the padded form agree.
fn canonical_address(segment: &str) -> Option<String> {
    if !(segment.starts_with("0x") || segment.starts_with("0X")) {
        return None;
    }
    AccountAddress::from_hex_literal(&segment.to_ascii_lowercase())
        .ok()
        .map(|addr| addr.to_hex_literal())
}
