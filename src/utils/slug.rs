//! URL slugs from localized names.

use uuid::Uuid;

/// Latin spelling of Turkmen and Russian letters
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'ç' => "c",
        'ä' => "a",
        'ň' => "n",
        'ö' => "o",
        'ş' => "s",
        'ü' => "u",
        'ý' => "y",
        'ž' => "z",
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        'ъ' | 'ь' => "",
        _ => return None,
    };
    Some(latin)
}

/// Lowercase ASCII slug with single dashes between words.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        let piece = if c.is_ascii_alphanumeric() {
            Some(c.to_string())
        } else {
            transliterate(c).map(str::to_string)
        };

        match piece {
            Some(piece) if !piece.is_empty() => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push_str(&piece);
            }
            Some(_) => {}
            None => pending_dash = true,
        }
    }

    slug
}

/// Slug from an explicit value, falling back to the name.
///
/// Never empty: when neither has a usable character a short random
/// token is used instead.
pub fn slug_or(explicit: Option<&str>, name: &str) -> String {
    explicit
        .map(slugify)
        .filter(|s| !s.is_empty())
        .or_else(|| Some(slugify(name)).filter(|s| !s.is_empty()))
        .unwrap_or_else(random_slug)
}

fn random_slug() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(12);
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(slugify("Apple Juice 1L"), "apple-juice-1l");
        assert_eq!(slugify("  --Hello,   World!--  "), "hello-world");
    }

    #[test]
    fn test_turkmen_and_russian() {
        assert_eq!(slugify("Alma şiresi"), "alma-siresi");
        assert_eq!(slugify("Яблочный сок"), "yablochnyy-sok");
        assert_eq!(slugify("Çörek"), "corek");
    }

    #[test]
    fn test_unmappable_input_is_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slug_or(Some("???"), "Fallback Name"), "fallback-name");
        assert_eq!(slug_or(Some("Custom"), "ignored"), "custom");
    }

    #[test]
    fn test_unmappable_name_gets_distinct_slugs() {
        let first = slug_or(None, "!!!");
        let second = slug_or(Some("???"), "***");
        assert_eq!(first.len(), 12);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
