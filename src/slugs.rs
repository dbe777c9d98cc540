//! Slug derivation

const MAX_SLUG_LEN: usize = 200;

/// Slug for a title, `""` when the title has nothing sluggable in it
pub fn slugify(title: &str) -> String {
    let mut s = ::slug::slugify(title);
    if s.len() > MAX_SLUG_LEN {
        s.truncate(MAX_SLUG_LEN);
        while s.ends_with('-') {
            s.pop();
        }
    }
    s
}

/// Candidate slugs in the order they are tried: `base`, `base-2`, `base-3`, ...
pub(crate) fn candidates(base: &str, max_suffix: u32) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((2..=max_suffix).map(move |n| format!("{}-{}", base, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_file_names() {
        assert_eq!(slugify("readme.txt"), "readme-txt");
        assert_eq!(slugify("screenshot-1.png"), "screenshot-1-png");
        assert_eq!(slugify("My Holiday Photo.JPG"), "my-holiday-photo-jpg");
        assert_eq!(slugify("..."), "");
    }

    #[test]
    fn test_slugify_caps_length() {
        let s = slugify(&"a".repeat(500));
        assert_eq!(s.len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_candidates() {
        let c: Vec<_> = candidates("doc", 4).collect();
        assert_eq!(c, vec!["doc", "doc-2", "doc-3", "doc-4"]);
    }
}
