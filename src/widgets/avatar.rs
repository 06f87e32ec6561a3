/// Avatar bubble: the profile image when there is one, initials otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub image_url: Option<String>,
    pub initials: String,
    /// Profile the bubble links to
    pub user_id: Option<String>,
}

impl Avatar {
    pub fn new(display_name: &str, image_url: Option<&str>, user_id: Option<&str>) -> Self {
        Self {
            image_url: image_url
                .filter(|url| !url.trim().is_empty())
                .map(str::to_string),
            initials: initials(display_name),
            user_id: user_id.map(str::to_string),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// First letter of up to two space-separated words, uppercased. `?` if empty.
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}
