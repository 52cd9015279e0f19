//! Built-in TLD presets.
//!
//! A sweep pairs one keyword with a list of suffixes. Presets give curated
//! lists for common cases; config files can add their own under
//! `[custom_presets]`.

use std::collections::HashMap;

/// Get predefined TLD presets for common use cases.
///
/// # Examples
///
/// ```rust
/// use whois_sweep_lib::get_preset_tlds;
///
/// let startup_tlds = get_preset_tlds("startup").unwrap();
/// assert!(startup_tlds.contains(&"io".to_string()));
/// ```
pub fn get_preset_tlds(preset: &str) -> Option<Vec<String>> {
    let tlds: Option<Vec<&str>> = match preset.to_lowercase().as_str() {
        "startup" => Some(vec!["com", "org", "io", "ai", "tech", "app", "dev", "xyz"]),
        "enterprise" => Some(vec!["com", "org", "net", "info", "biz", "us"]),
        "country" => Some(vec![
            "us", "uk", "de", "fr", "ca", "au", "br", "in", "nl", "it", "es", "se", "ch", "jp",
        ]),
        "popular" => Some(vec![
            "com", "net", "org", "io", "ai", "app", "dev", "tech", "me", "co", "xyz",
        ]),
        "classic" => Some(vec!["com", "net", "org", "info", "biz"]),
        "tech" => Some(vec![
            "io", "ai", "app", "dev", "tech", "cloud", "software", "digital", "codes", "systems",
            "network", "solutions",
        ]),
        "creative" => Some(vec![
            "design",
            "art",
            "studio",
            "media",
            "photography",
            "film",
            "music",
            "gallery",
            "graphics",
            "ink",
        ]),
        "ecommerce" | "shopping" => Some(vec![
            "shop", "store", "market", "sale", "deals", "shopping", "buy", "bargains",
        ]),
        "web" => Some(vec![
            "web", "site", "website", "online", "blog", "page", "wiki", "host", "email",
        ]),
        "trendy" => Some(vec![
            "xyz", "online", "site", "top", "icu", "fun", "space", "click", "website", "life",
            "world", "live", "today",
        ]),
        _ => None,
    };
    tlds.map(|v| v.into_iter().map(|s| s.to_string()).collect())
}

/// Look up a preset, checking custom presets before the built-in ones.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use whois_sweep_lib::get_preset_tlds_with_custom;
///
/// let mut custom = HashMap::new();
/// custom.insert("mine".to_string(), vec!["com".to_string(), "dev".to_string()]);
///
/// let tlds = get_preset_tlds_with_custom("mine", Some(&custom)).unwrap();
/// assert_eq!(tlds, vec!["com", "dev"]);
/// ```
pub fn get_preset_tlds_with_custom(
    preset: &str,
    custom_presets: Option<&HashMap<String, Vec<String>>>,
) -> Option<Vec<String>> {
    let preset_lower = preset.to_lowercase();

    if let Some(custom_map) = custom_presets {
        if let Some(custom_tlds) = custom_map
            .get(preset)
            .or_else(|| custom_map.get(&preset_lower))
        {
            return Some(custom_tlds.clone());
        }
    }

    get_preset_tlds(&preset_lower)
}

/// Names of the built-in presets, sorted.
pub fn get_available_presets() -> Vec<&'static str> {
    vec![
        "classic",
        "country",
        "creative",
        "ecommerce",
        "enterprise",
        "popular",
        "startup",
        "tech",
        "trendy",
        "web",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_preset() {
        let tlds = get_preset_tlds("startup").unwrap();
        assert_eq!(tlds.len(), 8);
        assert!(tlds.contains(&"io".to_string()));
        assert!(tlds.contains(&"ai".to_string()));
    }

    #[test]
    fn test_invalid_preset() {
        assert!(get_preset_tlds("nonexistent").is_none());
    }

    #[test]
    fn test_preset_case_insensitive() {
        assert_eq!(get_preset_tlds("POPULAR"), get_preset_tlds("popular"));
    }

    #[test]
    fn test_every_listed_preset_resolves() {
        for name in get_available_presets() {
            let tlds = get_preset_tlds(name).unwrap_or_default();
            assert!(!tlds.is_empty(), "preset '{}' is empty", name);
            for tld in tlds {
                assert!(!tld.contains('.'), "preset '{}' has dotted TLD", name);
            }
        }
    }

    #[test]
    fn test_available_presets_sorted() {
        let presets = get_available_presets();
        let mut sorted = presets.clone();
        sorted.sort();
        assert_eq!(presets, sorted);
    }

    #[test]
    fn test_ecommerce_alias() {
        assert_eq!(get_preset_tlds("shopping"), get_preset_tlds("ecommerce"));
    }

    #[test]
    fn test_custom_preset_overrides_builtin() {
        let mut custom = HashMap::new();
        custom.insert("popular".to_string(), vec!["lol".to_string()]);
        assert_eq!(
            get_preset_tlds_with_custom("popular", Some(&custom)),
            Some(vec!["lol".to_string()])
        );
        assert_eq!(
            get_preset_tlds_with_custom("classic", Some(&custom)),
            get_preset_tlds("classic")
        );
        assert_eq!(get_preset_tlds_with_custom("missing", None), None);
    }
}
