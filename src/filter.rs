use crate::model::Word;

/// Selects the words matching the given category names and starting letters.
///
/// An empty category list means "all categories" and an empty letter list
/// means "all letters"; both restrictions apply conjunctively. Category
/// matching is case-sensitive and exact; letter matching compares the first
/// character of the English term case-insensitively against each entry.
pub fn filter_words(all: &[Word], categories: &[String], letters: &[String]) -> Vec<Word> {
    all.iter()
        .filter(|word| matches_categories(word, categories) && matches_letters(word, letters))
        .cloned()
        .collect()
}

fn matches_categories(word: &Word, categories: &[String]) -> bool {
    categories.is_empty() || categories.iter().any(|c| *c == word.category)
}

fn matches_letters(word: &Word, letters: &[String]) -> bool {
    if letters.is_empty() {
        return true;
    }
    // Only the English field is inspected for letter filtering.
    let first = match word.english.chars().next() {
        Some(c) => c.to_lowercase().to_string(),
        None => return false,
    };
    letters.iter().any(|l| l.to_lowercase() == first)
}

/// Substring search over both terms, case-insensitive. Used by the word list.
pub fn search_words(all: &[Word], term: &str) -> Vec<Word> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return all.to_vec();
    }
    all.iter()
        .filter(|word| {
            word.english.to_lowercase().contains(&term)
                || word.turkish.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn word(id: i32, english: &str, turkish: &str, category: &str) -> Word {
        Word {
            id,
            english: english.to_string(),
            turkish: turkish.to_string(),
            category: category.to_string(),
            created_at: NaiveDateTime::default(),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<Word> {
        vec![
            word(1, "apple", "elma", "Yiyecekler"),
            word(2, "cat", "kedi", "Hayvanlar"),
            word(3, "Carrot", "havuç", "Yiyecekler"),
            word(4, "dog", "köpek", "Hayvanlar"),
        ]
    }

    #[test]
    fn test_empty_filters_return_everything() {
        let words = sample();
        let result = filter_words(&words, &[], &[]);
        assert_eq!(result, words);
    }

    #[test]
    fn test_category_filter_is_exact_and_case_sensitive() {
        let words = sample();
        let result = filter_words(&words, &strings(&["Hayvanlar"]), &[]);
        assert_eq!(
            result.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![2, 4]
        );

        // "hayvanlar" is a different name
        assert!(filter_words(&words, &strings(&["hayvanlar"]), &[]).is_empty());
    }

    #[test]
    fn test_letter_filter_is_case_insensitive_on_english_only() {
        let words = sample();
        let result = filter_words(&words, &[], &strings(&["C"]));
        assert_eq!(
            result.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![2, 3]
        );

        // "elma" starts with e but letter matching never looks at the Turkish term
        assert!(filter_words(&words, &[], &strings(&["e"])).is_empty());
    }

    #[test]
    fn test_both_filters_apply_conjunctively() {
        let words = sample();
        let result = filter_words(&words, &strings(&["Yiyecekler"]), &strings(&["c"]));
        assert_eq!(result.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_filters_compose() {
        let words = sample();
        let categories = strings(&["Hayvanlar", "Yiyecekler"]);
        let letters = strings(&["a", "d"]);

        let combined = filter_words(&words, &categories, &letters);
        let staged = filter_words(&filter_words(&words, &categories, &[]), &[], &letters);
        assert_eq!(combined, staged);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let words = sample();
        let before = words.clone();
        let _ = filter_words(&words, &strings(&["Hayvanlar"]), &strings(&["c"]));
        assert_eq!(words, before);
    }

    #[test]
    fn test_search_matches_either_term() {
        let words = sample();
        let result = search_words(&words, "KED");
        assert_eq!(result.iter().map(|w| w.id).collect::<Vec<_>>(), vec![2]);

        let result = search_words(&words, "  ");
        assert_eq!(result, words);
    }
}
