//! Fixed mapping tables shared by both feature schemas: condition ranks,
//! material classes, and the special-variant detectors. All matching is
//! case-insensitive over trimmed input.

use crate::types::MaterialClass;

/// Pure precious-metal case materials (lower-cased). Maps to `Gold`.
const GOLD_MATERIALS: &[&str] = &[
    "yellow gold",
    "white gold",
    "red gold",
    "rose gold",
    "platinum",
];

/// Steel/gold combination materials (lower-cased). Maps to `Bicolor`.
/// Must stay disjoint from `GOLD_MATERIALS`.
const BICOLOR_MATERIALS: &[&str] = &["gold/steel"];

/// Ordinal condition rank, worst (0) to best (3). Unrecognized labels get
/// the mid-tier rank 1 — the model was trained with the same fallback, so
/// an unknown label is a default, not an error.
pub fn condition_rank(label: &str) -> f64 {
    match label.trim().to_lowercase().as_str() {
        "unworn" | "new" => 3.0,
        "very good" => 2.0,
        "good" | "incomplete" | "unknown" => 1.0,
        "fair" | "poor" => 0.0,
        _ => 1.0,
    }
}

/// Classify a free-text material into exactly one of the three classes.
pub fn material_class(material: &str) -> MaterialClass {
    let m = material.trim().to_lowercase();
    if GOLD_MATERIALS.contains(&m.as_str()) {
        MaterialClass::Gold
    } else if BICOLOR_MATERIALS.contains(&m.as_str()) {
        MaterialClass::Bicolor
    } else {
        MaterialClass::Steel
    }
}

/// "Hulk" detector: the 116610LV reference or the collector nickname,
/// anywhere in the model string.
pub fn is_hulk(model: &str) -> bool {
    let m = model.to_lowercase();
    m.contains("116610lv") || m.contains("hulk")
}

/// "Kermit" detector: the 16610LV reference or the collector nickname.
/// Note that `116610lv` contains `16610lv`, so a Hulk reference also trips
/// this detector — the training pipeline applies the identical substring
/// rule, so serving must match it.
pub fn is_kermit(model: &str) -> bool {
    let m = model.to_lowercase();
    m.contains("16610lv") || m.contains("kermit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_ranks_cover_known_labels() {
        assert_eq!(condition_rank("Unworn"), 3.0);
        assert_eq!(condition_rank("New"), 3.0);
        assert_eq!(condition_rank("Very good"), 2.0);
        assert_eq!(condition_rank("Good"), 1.0);
        assert_eq!(condition_rank("Incomplete"), 1.0);
        assert_eq!(condition_rank("Unknown"), 1.0);
        assert_eq!(condition_rank("Fair"), 0.0);
        assert_eq!(condition_rank("Poor"), 0.0);
    }

    #[test]
    fn unknown_condition_defaults_to_mid_tier() {
        assert_eq!(condition_rank("Mint"), 1.0);
        assert_eq!(condition_rank(""), 1.0);
        assert_eq!(condition_rank("pristine, never worn"), 1.0);
    }

    #[test]
    fn condition_rank_is_case_insensitive_and_stable() {
        for label in ["Unworn", "Very good", "Fair"] {
            let upper = condition_rank(&label.to_uppercase());
            let lower = condition_rank(&label.to_lowercase());
            assert_eq!(upper, lower);
            // Same input always produces the same rank.
            assert_eq!(condition_rank(label), condition_rank(label));
        }
    }

    #[test]
    fn material_partition() {
        assert_eq!(material_class("Yellow gold"), MaterialClass::Gold);
        assert_eq!(material_class("White gold"), MaterialClass::Gold);
        assert_eq!(material_class("Red gold"), MaterialClass::Gold);
        assert_eq!(material_class("Rose gold"), MaterialClass::Gold);
        assert_eq!(material_class("Platinum"), MaterialClass::Gold);
        assert_eq!(material_class("Gold/Steel"), MaterialClass::Bicolor);
        assert_eq!(material_class("Steel"), MaterialClass::Steel);
        assert_eq!(material_class("Titanium"), MaterialClass::Steel);
        assert_eq!(material_class(""), MaterialClass::Steel);
    }

    #[test]
    fn material_matching_ignores_case() {
        assert_eq!(material_class("YELLOW GOLD"), MaterialClass::Gold);
        assert_eq!(material_class("gold/steel"), MaterialClass::Bicolor);
    }

    #[test]
    fn gold_and_bicolor_sets_are_disjoint() {
        for m in GOLD_MATERIALS {
            assert!(!BICOLOR_MATERIALS.contains(m), "{m} is in both sets");
        }
    }

    #[test]
    fn hulk_detection_by_reference_and_nickname() {
        assert!(is_hulk("116610LV"));
        assert!(is_hulk("Submariner 116610lv"));
        assert!(is_hulk("Submariner Hulk"));
        assert!(is_hulk("HULK full set"));
        assert!(!is_hulk("Submariner 116610LN"));
    }

    #[test]
    fn kermit_detection_by_reference_and_nickname() {
        assert!(is_kermit("16610LV"));
        assert!(is_kermit("Submariner Kermit"));
        assert!(!is_kermit("Submariner 16610"));
    }

    #[test]
    fn different_casings_classify_identically() {
        assert_eq!(is_hulk("116610LV"), is_hulk("116610lv"));
        assert_eq!(is_kermit("KERMIT"), is_kermit("kermit"));
    }

    #[test]
    fn hulk_reference_also_trips_kermit_substring() {
        // 16610lv is a substring of 116610lv; training encodes it the same way.
        assert!(is_kermit("116610LV"));
    }
}
