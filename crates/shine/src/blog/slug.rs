/// Base used when a title has no characters that survive slugification.
const FALLBACK_SLUG: &str = "post";

/// Lowercase, ASCII-only, hyphen separated form of `title`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        let ch = match fold_to_ascii(ch) {
            Some(ch) => ch,
            None => continue,
        };

        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

fn fold_to_ascii(ch: char) -> Option<char> {
    if ch.is_ascii() {
        return Some(ch);
    }
    if ch.is_whitespace() {
        return Some(' ');
    }

    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        _ => return None,
    };
    Some(folded)
}

/// Path segments with their own route under `/api/posts/`. A post slug equal to one
/// of these could never be addressed.
pub const RESERVED_SLUGS: [&str; 5] = ["featured", "popular", "recent", "categories", "bulk"];

/// First of `base`, `base-1`, `base-2`, ... that is not reserved and for which
/// `taken` reports false.
pub fn unique_slug<E>(
    base: &str,
    mut taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    let base = if base.is_empty() { FALLBACK_SLUG } else { base };
    let mut candidate = base.to_string();
    let mut counter = 1u32;
    while RESERVED_SLUGS.contains(&candidate.as_str()) || taken(&candidate)? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }
    Ok(candidate)
}
