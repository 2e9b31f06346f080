use crate::models::{Food, Nutrients};

/// The foods a new installation starts with.
pub fn default_catalog() -> Vec<Food> {
    vec![
        Food::new("f1", "Chicken Breast", 1.0)
            .with_brand("Generic")
            .with_category("Protein")
            .with_nutrients(Nutrients::new(165.0, 31.0, 0.0, 3.6)),
        Food::new("f2", "Brown Rice", 1.0)
            .with_brand("Generic")
            .with_category("Carb")
            .with_nutrients(Nutrients::new(218.0, 4.5, 45.8, 1.6)),
        Food::new("f3", "Broccoli", 1.0)
            .with_brand("Generic")
            .with_category("Veg")
            .with_nutrients(Nutrients::new(55.0, 3.7, 11.2, 0.6)),
    ]
}

/// Fills an empty catalog with the defaults. Returns true if it seeded.
pub fn seed_catalog(foods: &mut Vec<Food>) -> bool {
    if !foods.is_empty() {
        return false;
    }
    foods.extend(default_catalog());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let foods = default_catalog();
        let ids: Vec<&str> = foods.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2", "f3"]);
        assert_eq!(foods[1].name, "Brown Rice");
        assert_eq!(foods[1].carbs_g, 45.8);
        assert!(foods.iter().all(|f| f.brand == "Generic"));
    }

    #[test]
    fn test_seed_only_when_empty() {
        let mut foods = Vec::new();
        assert!(seed_catalog(&mut foods));
        assert_eq!(foods.len(), 3);

        let mut custom = vec![Food::new("x", "Mine", 50.0)];
        assert!(!seed_catalog(&mut custom));
        assert_eq!(custom.len(), 1);
    }
}
