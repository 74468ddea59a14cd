/// Checks whether a URL path follows the content-page convention
///
/// A content path starts with `prefix` and ends with `extension`. The prefix
/// is compared exactly; the extension ignores ASCII case since the site mixes
/// `.htm` and `.HTM`.
///
/// # Examples
///
/// ```
/// use pokedex_harvest::url::matches_content_path;
///
/// assert!(matches_content_path("/conteudo/pokemon/lista02.htm", "/conteudo/pokemon/", ".htm"));
/// assert!(!matches_content_path("/conteudo/itens/lista01.htm", "/conteudo/pokemon/", ".htm"));
/// assert!(!matches_content_path("/conteudo/pokemon/", "/conteudo/pokemon/", ".htm"));
/// ```
pub fn matches_content_path(path: &str, prefix: &str, extension: &str) -> bool {
    if !path.starts_with(prefix) {
        return false;
    }

    let rest = &path[prefix.len()..];
    if rest.len() <= extension.len() {
        return false;
    }

    let split = rest.len() - extension.len();
    rest.is_char_boundary(split) && rest[split..].eq_ignore_ascii_case(extension)
}
