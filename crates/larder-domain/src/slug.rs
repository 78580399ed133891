//! URL slug normalization and collision-free slug allocation.
//!
//! Slugs are assigned once at creation and never rewritten.

use std::future::Future;

/// Normalize free text into a slug.
///
/// Letters and digits are lowercased and kept, with common Latin diacritics folded to ASCII
/// (`Crème` and `Creme` share a slug). Whitespace, `-` and `_` collapse into a
/// single `-`. `@` becomes the word `at`. Any other punctuation is dropped. Leading and
/// trailing separators are trimmed, so text without letters or digits yields `""`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in c.to_lowercase() {
                match fold_latin(lower) {
                    Some(ascii) => slug.push_str(ascii),
                    None => slug.push(lower),
                }
            }
        } else if c == '@' {
            if !slug.is_empty() {
                slug.push('-');
            }
            slug.push_str("at");
            pending_separator = true;
        } else if c == '-' || c == '_' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    slug
}

/// ASCII spelling of a lowercase Latin letter with a diacritic or ligature.
fn fold_latin(c: char) -> Option<&'static str> {
    let ascii = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        'þ' => "th",
        _ => return None,
    };
    Some(ascii)
}

/// Allocate the first free slug for `seed`: `base`, then `base-2`, `base-3`, …
///
/// `base` is `slugify(seed)`, or `fallback` verbatim when the seed normalizes to nothing.
/// `exists` is asked about each candidate in turn; callers should include soft-deleted
/// rows in that lookup so a restored record can never collide.
///
/// ```
/// # tokio_test_block(async {
/// use larder_domain::slug::next_unique_slug;
///
/// let taken = ["pasta", "pasta-2"];
/// let slug = next_unique_slug("  Pasta ", "recipe", |candidate| async move {
///     Ok::<_, ()>(taken.contains(&candidate.as_str()))
/// })
/// .await
/// .unwrap();
/// assert_eq!(slug, "pasta-3");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn next_unique_slug<F, Fut, E>(
    seed: &str,
    fallback: &str,
    mut exists: F,
) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut base = slugify(seed.trim());
    if base.is_empty() {
        base = fallback.to_owned();
    }

    let mut candidate = base.clone();
    let mut counter = 2u32;
    while exists(candidate.clone()).await? {
        candidate = format!("{base}-{counter}");
        counter += 1;
    }

    Ok(candidate)
}
