use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// Optional categorical field usable as an exact-match filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Maker,
    Line,
    Corner,
    CatL,
    CatM,
    CatS,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::Maker,
        Facet::Line,
        Facet::Corner,
        Facet::CatL,
        Facet::CatM,
        Facet::CatS,
    ];

    fn default_label(&self) -> &'static str {
        match self {
            Self::Maker => "メーカー",
            Self::Line => "ライン",
            Self::Corner => "コーナー",
            Self::CatL => "大分類",
            Self::CatM => "中分類",
            Self::CatS => "小分類",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Maker => write!(f, "maker"),
            Self::Line => write!(f, "line"),
            Self::Corner => write!(f, "corner"),
            Self::CatL => write!(f, "cat_l"),
            Self::CatM => write!(f, "cat_m"),
            Self::CatS => write!(f, "cat_s"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Logical field → literal column name. Optional columns deserialize `""` as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub member: String,
    pub date: String,
    pub time: String,
    pub store: String,
    pub item: String,
    pub amount: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub qty: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub maker: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub line: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub corner: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub cat_l: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub cat_m: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub cat_s: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub jan: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainProfile {
    pub key: String,
    pub name: String,
    pub columns: ColumnMapping,
    /// Display labels overriding the generic facet labels.
    #[serde(default)]
    pub labels: BTreeMap<Facet, String>,
    #[serde(default)]
    pub notices: Vec<String>,
}

impl ChainProfile {
    pub fn facet_column(&self, facet: Facet) -> Option<&str> {
        let c = &self.columns;
        match facet {
            Facet::Maker => c.maker.as_deref(),
            Facet::Line => c.line.as_deref(),
            Facet::Corner => c.corner.as_deref(),
            Facet::CatL => c.cat_l.as_deref(),
            Facet::CatM => c.cat_m.as_deref(),
            Facet::CatS => c.cat_s.as_deref(),
        }
    }

    pub fn label(&self, facet: Facet) -> &str {
        self.labels
            .get(&facet)
            .map(String::as_str)
            .unwrap_or_else(|| facet.default_label())
    }

    pub fn required_columns(&self) -> Vec<&str> {
        let c = &self.columns;
        vec![&c.member, &c.date, &c.time, &c.store, &c.item, &c.amount]
            .into_iter()
            .map(String::as_str)
            .collect()
    }

    pub fn optional_columns(&self) -> Vec<&str> {
        let c = &self.columns;
        [&c.qty, &c.maker, &c.corner, &c.line, &c.cat_l, &c.cat_m, &c.cat_s, &c.jan]
            .into_iter()
            .filter_map(|col| col.as_deref())
            .collect()
    }

    /// Required columns not present in `headers`, in logical-field order.
    pub fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        self.required_columns()
            .into_iter()
            .filter(|c| !has(headers, c))
            .map(str::to_string)
            .collect()
    }

    /// Member column plus amount or quantity column.
    fn strong_signal(&self, headers: &[String]) -> bool {
        let c = &self.columns;
        has(headers, &c.member)
            && (has(headers, &c.amount) || c.qty.as_deref().is_some_and(|q| has(headers, q)))
    }

    fn weak_signal(&self, headers: &[String]) -> bool {
        has(headers, &self.columns.member)
    }
}

fn has(headers: &[String], column: &str) -> bool {
    headers.iter().any(|h| h == column)
}

// ---------------------------------------------------------------------------
// Built-in chains
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinChain {
    /// Chain A. Full-width parentheses in amount/quantity headers.
    Tomods,
    /// Chain B. Mixed full/half-width parentheses; line/corner facets, no maker.
    Summit,
}

impl BuiltinChain {
    pub fn profile(self) -> ChainProfile {
        match self {
            Self::Tomods => ChainProfile {
                key: "TOMODS".into(),
                name: "トモズ".into(),
                columns: ColumnMapping {
                    member: "会員番号/匿名会員番号".into(),
                    date: "買上日".into(),
                    time: "買上時間".into(),
                    store: "店舗名".into(),
                    item: "商品名".into(),
                    amount: "買上金額（会員）".into(),
                    qty: Some("買上点数（会員）".into()),
                    maker: Some("メーカー/取引先".into()),
                    line: None,
                    corner: None,
                    cat_l: Some("大分類".into()),
                    cat_m: Some("中分類".into()),
                    cat_s: Some("小分類".into()),
                    jan: Some("JANコード".into()),
                },
                labels: BTreeMap::from([(Facet::Maker, "メーカー/取引先".to_string())]),
                notices: vec![
                    "トモズ形式：列名は全角カッコ（例：買上金額（会員））が多いです。".into(),
                    "レシートID列は不要（会員×店舗×買上日×買上時間で擬似生成）。".into(),
                ],
            },
            Self::Summit => ChainProfile {
                key: "SUMMIT".into(),
                name: "サミット".into(),
                columns: ColumnMapping {
                    member: "匿名会員番号".into(),
                    date: "買上日".into(),
                    time: "買上時間".into(),
                    store: "店舗名".into(),
                    item: "商品名".into(),
                    amount: "買上金額（会員)".into(),
                    qty: Some("買上点数（会員)".into()),
                    maker: None,
                    line: Some("ライン名".into()),
                    corner: Some("コーナー名".into()),
                    cat_l: Some("部門名".into()),
                    cat_m: Some("カテゴリ名".into()),
                    cat_s: None,
                    jan: Some("JANコード".into()),
                },
                labels: BTreeMap::from([
                    (Facet::CatL, "部門".to_string()),
                    (Facet::CatM, "カテゴリ".to_string()),
                ]),
                notices: vec![
                    "サミット形式：列名は半角カッコ（例：買上金額（会員)）が混ざることがあります。".into(),
                    "レシートID列は不要（会員×店舗×買上日×買上時間で擬似生成）。".into(),
                ],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Registry + resolution
// ---------------------------------------------------------------------------

/// Ordered set of profiles with the detection priority used by [`ProfileRegistry::resolve`].
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: Vec<ChainProfile>,
    strong_order: Vec<usize>,
    weak_order: Vec<usize>,
    default: usize,
}

/// On-disk profile file.
///
/// ```toml
/// default = "TOMODS"
/// strong_order = ["SUMMIT", "TOMODS", "ACME"]
///
/// [[profiles]]
/// key = "ACME"
/// name = "Acme"
/// [profiles.columns]
/// member = "member_id"
/// # ...
/// ```
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default = "default_true")]
    include_builtin: bool,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    strong_order: Option<Vec<String>>,
    #[serde(default)]
    weak_order: Option<Vec<String>>,
    #[serde(default)]
    profiles: Vec<ChainProfile>,
}

fn default_true() -> bool {
    true
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// TOMODS and SUMMIT. Strong signals are checked SUMMIT first, weak signals
    /// TOMODS first, and TOMODS is the fallback.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![BuiltinChain::Tomods.profile(), BuiltinChain::Summit.profile()],
            strong_order: vec![1, 0],
            weak_order: vec![0, 1],
            default: 0,
        }
    }

    /// Build a registry from a TOML profile file. Unless `include_builtin = false`,
    /// the built-in profiles come first; a file profile with a built-in key replaces it.
    pub fn from_toml(input: &str) -> Result<Self, LoadError> {
        let file: ProfileFile =
            toml::from_str(input).map_err(|e| LoadError::ProfileConfig(e.to_string()))?;

        let mut registry = if file.include_builtin {
            Self::builtin()
        } else {
            Self { profiles: Vec::new(), strong_order: Vec::new(), weak_order: Vec::new(), default: 0 }
        };

        let mut seen: Vec<&str> = Vec::new();
        for profile in &file.profiles {
            if seen.contains(&profile.key.as_str()) {
                return Err(LoadError::ProfileConfig(format!(
                    "duplicate profile key '{}'",
                    profile.key
                )));
            }
            seen.push(&profile.key);
            validate_profile(profile)?;

            match registry.position(&profile.key) {
                Some(idx) => registry.profiles[idx] = profile.clone(),
                None => {
                    registry.profiles.push(profile.clone());
                    let idx = registry.profiles.len() - 1;
                    registry.strong_order.push(idx);
                    registry.weak_order.push(idx);
                }
            }
        }

        if registry.profiles.is_empty() {
            return Err(LoadError::ProfileConfig("no profiles defined".into()));
        }

        if let Some(ref keys) = file.strong_order {
            registry.strong_order = registry.indices(keys, "strong_order")?;
        }
        if let Some(ref keys) = file.weak_order {
            registry.weak_order = registry.indices(keys, "weak_order")?;
        }
        if let Some(ref key) = file.default {
            registry.default = registry.position(key).ok_or_else(|| {
                LoadError::ProfileConfig(format!("default: unknown profile '{key}'"))
            })?;
        }

        Ok(registry)
    }

    pub fn profiles(&self) -> &[ChainProfile] {
        &self.profiles
    }

    pub fn get(&self, key: &str) -> Option<&ChainProfile> {
        self.position(key).map(|i| &self.profiles[i])
    }

    pub fn default_profile(&self) -> &ChainProfile {
        &self.profiles[self.default]
    }

    /// Select the profile for a header row. First match wins:
    /// any profile's strong signal (in strong order), then any weak signal
    /// (in weak order), then the default. Never fails.
    pub fn resolve(&self, headers: &[String]) -> &ChainProfile {
        if let Some(&i) = self.strong_order.iter().find(|&&i| self.profiles[i].strong_signal(headers)) {
            log::debug!("profile {}: member + amount/qty columns present", self.profiles[i].key);
            return &self.profiles[i];
        }
        if let Some(&i) = self.weak_order.iter().find(|&&i| self.profiles[i].weak_signal(headers)) {
            log::debug!("profile {}: member column present", self.profiles[i].key);
            return &self.profiles[i];
        }
        let fallback = self.default_profile();
        log::debug!("profile {}: no signal matched, using default", fallback.key);
        fallback
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.key == key)
    }

    fn indices(&self, keys: &[String], field: &str) -> Result<Vec<usize>, LoadError> {
        keys.iter()
            .map(|k| {
                self.position(k).ok_or_else(|| {
                    LoadError::ProfileConfig(format!("{field}: unknown profile '{k}'"))
                })
            })
            .collect()
    }
}

fn validate_profile(profile: &ChainProfile) -> Result<(), LoadError> {
    if profile.key.trim().is_empty() {
        return Err(LoadError::ProfileConfig("profile key must not be empty".into()));
    }
    let c = &profile.columns;
    let required = [
        ("member", &c.member),
        ("date", &c.date),
        ("time", &c.time),
        ("store", &c.store),
        ("item", &c.item),
        ("amount", &c.amount),
    ];
    for (field, column) in required {
        if column.trim().is_empty() {
            return Err(LoadError::ProfileConfig(format!(
                "profile '{}': required column '{field}' must not be empty",
                profile.key
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
