// Asset URL Templating
//
// Resolves avatar/banner/artwork references to fetchable CDN URLs.
// Asset hashes prefixed with "a_" are animated and resolve to gif.

const CDN_BASE: &str = "https://cdn.discordapp.com";
const SPOTIFY_IMAGE_BASE: &str = "https://i.scdn.co/image";

fn ext_for(hash: &str) -> &'static str {
    if hash.starts_with("a_") {
        "gif"
    } else {
        "png"
    }
}

/// Deterministic default-avatar index derived from the numeric identity.
fn default_avatar_index(user_id: &str) -> u64 {
    user_id.parse::<u64>().map(|n| n % 5).unwrap_or(0)
}

/// Avatar URL, falling back to one of the five stock avatars when the
/// user has no custom avatar.
pub fn avatar_url(user_id: &str, avatar: Option<&str>) -> String {
    match avatar {
        Some(hash) => format!(
            "{}/avatars/{}/{}.{}?size=512",
            CDN_BASE,
            user_id,
            hash,
            ext_for(hash)
        ),
        None => format!(
            "{}/embed/avatars/{}.png",
            CDN_BASE,
            default_avatar_index(user_id)
        ),
    }
}

/// Banner URL; users without a banner get none.
pub fn banner_url(user_id: &str, banner: Option<&str>) -> Option<String> {
    banner.map(|hash| {
        format!(
            "{}/banners/{}/{}.{}?size=1024",
            CDN_BASE,
            user_id,
            hash,
            ext_for(hash)
        )
    })
}

/// Track artwork: album art refs arrive either as full URLs or as a
/// "spotify:<hash>" asset reference.
pub fn artwork_url(raw: &str) -> String {
    if let Some(hash) = raw.strip_prefix("spotify:") {
        format!("{}/{}", SPOTIFY_IMAGE_BASE, hash)
    } else {
        raw.to_string()
    }
}

/// Public profile link for the tracked user.
pub fn profile_url(user_id: &str) -> String {
    format!("https://discord.com/users/{}", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_avatar() {
        assert_eq!(
            avatar_url("1319292111325106296", Some("cafe01")),
            "https://cdn.discordapp.com/avatars/1319292111325106296/cafe01.png?size=512"
        );
    }

    #[test]
    fn test_animated_avatar_resolves_to_gif() {
        assert!(avatar_url("7", Some("a_cafe01")).ends_with("a_cafe01.gif?size=512"));
    }

    #[test]
    fn test_default_avatar_is_deterministic() {
        // 1319292111325106296 % 5 == 1
        assert_eq!(
            avatar_url("1319292111325106296", None),
            "https://cdn.discordapp.com/embed/avatars/1.png"
        );
        // non-numeric identity falls back to index 0
        assert_eq!(
            avatar_url("not-a-number", None),
            "https://cdn.discordapp.com/embed/avatars/0.png"
        );
    }

    #[test]
    fn test_banner_url() {
        assert_eq!(banner_url("7", None), None);
        assert_eq!(
            banner_url("7", Some("a_b1")).as_deref(),
            Some("https://cdn.discordapp.com/banners/7/a_b1.gif?size=1024")
        );
    }

    #[test]
    fn test_profile_url() {
        assert_eq!(
            profile_url("1319292111325106296"),
            "https://discord.com/users/1319292111325106296"
        );
    }

    #[test]
    fn test_artwork_url() {
        assert_eq!(
            artwork_url("spotify:ab67616d"),
            "https://i.scdn.co/image/ab67616d"
        );
        assert_eq!(
            artwork_url("https://i.scdn.co/image/x"),
            "https://i.scdn.co/image/x"
        );
    }
}
