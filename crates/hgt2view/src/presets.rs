//! Named observer locations in continental Ecuador.

/// (key, display name, latitude, longitude)
pub const PRESETS: &[(&str, &str, f64, f64)] = &[
    ("quito", "Quito", -0.1807, -78.4678),
    ("guayaquil", "Guayaquil", -2.1709, -79.9224),
    ("cuenca", "Cuenca", -2.9001, -79.0059),
    ("manta", "Manta", -0.9673, -80.2627),
    ("esmeraldas", "Esmeraldas", 0.9538, -79.6528),
    ("loja", "Loja", -3.9890, -79.2036),
    ("ambato", "Ambato", -1.2549, -78.6291),
    ("riobamba", "Riobamba", -1.6735, -78.6483),
    ("ibarra", "Ibarra", 0.3517, -78.1222),
    ("machala", "Machala", -3.2581, -79.9554),
    ("cotopaxi", "Volcan Cotopaxi", -0.6137, -78.4729),
    ("chimborazo", "Chimborazo", -1.4691, -78.8175),
];

/// Looks a preset up by its key, case-insensitively.
pub fn find(key: &str) -> Option<(&'static str, f64, f64)> {
    let key = key.to_ascii_lowercase();
    PRESETS
        .iter()
        .find(|(k, _, _, _)| *k == key)
        .map(|&(_, name, lat, lon)| (name, lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let (name, lat, lon) = find("Quito").unwrap();
        assert_eq!(name, "Quito");
        assert!((lat + 0.1807).abs() < 1e-9);
        assert!((lon + 78.4678).abs() < 1e-9);
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(find("atlantis").is_none());
    }
}
