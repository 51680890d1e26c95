//! Instance ids of platform clients.

const ID_ALPHABET: [char; 31] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'X', 'Y', 'Z',
];

pub fn generate_id(len: usize) -> String {
    if len == 0 {
        return String::new();
    }
    nanoid::format(nanoid::rngs::default, &ID_ALPHABET, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_ids_of_requested_length() {
        assert_eq!(generate_id(12).len(), 12);
        assert!(generate_id(0).is_empty());
    }

    #[test]
    fn uses_only_the_safe_alphabet() {
        let id = generate_id(200);
        assert!(id.chars().all(|c| ID_ALPHABET.contains(&c)));
        assert!(!id.contains(['A', 'E', 'I', 'O', 'U']));
    }

    #[test]
    fn ids_differ() {
        assert_ne!(generate_id(12), generate_id(12));
    }
}
