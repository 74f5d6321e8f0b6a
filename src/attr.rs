use scraper::ElementRef;

/// Returns the first candidate that is non-empty once trimmed, or an empty string.
pub fn resolve_image_url<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_owned()
}

/// Resolves an element's image source from `attrs`, most preferred first.
pub fn resolve_element_url(element: ElementRef<'_>, attrs: &[&str]) -> String {
    let value = element.value();
    resolve_image_url(attrs.iter().map(|name| value.attr(name)))
}
