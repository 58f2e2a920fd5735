//! Channel model and name lookup.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::ImageField;
use crate::error::LookupError;

/// One entry of the directory's `playlists` array, best quality first.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Playlist {
    pub url: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Channel {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    /// The directory encodes this as a string ("123"); the cache as a number.
    #[serde(default, deserialize_with = "listener_count")]
    pub listeners: u64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub largeimage: String,
    #[serde(default)]
    pub xlimage: String,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

impl Channel {
    /// Image URL for the configured size, falling back to any size present.
    pub fn image_url(&self, field: ImageField) -> &str {
        let preferred = match field {
            ImageField::Image => &self.image,
            ImageField::LargeImage => &self.largeimage,
            ImageField::XlImage => &self.xlimage,
        };
        [preferred, &self.xlimage, &self.largeimage, &self.image]
            .into_iter()
            .find(|u| !u.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn listener_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Ordered channel list for one run. Passed explicitly to whatever needs
/// lookup or resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChannelDirectory {
    pub channels: Vec<Channel>,
}

impl ChannelDirectory {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    /// First channel, in directory order, whose title contains `name`
    /// case-insensitively.
    ///
    /// Containment is loose: "Groove" picks whichever Groove channel is listed
    /// first. When several titles match, the others are logged.
    pub fn find(&self, name: &str) -> Result<&Channel, LookupError> {
        let needle = name.to_lowercase();
        let mut matches = self
            .channels
            .iter()
            .filter(|c| c.title.to_lowercase().contains(&needle));

        let first = matches
            .next()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        let others: Vec<&str> = matches.map(|c| c.title.as_str()).collect();
        if !others.is_empty() {
            tracing::warn!(
                "{:?} is ambiguous, using {:?} (also matches {:?})",
                name,
                first.title,
                others
            );
        }
        Ok(first)
    }

    /// Channels ordered by listener count, busiest first. Ties keep
    /// directory order.
    pub fn by_listeners(&self) -> Vec<&Channel> {
        let mut sorted: Vec<&Channel> = self.channels.iter().collect();
        sorted.sort_by(|a, b| b.listeners.cmp(&a.listeners));
        sorted
    }

    pub fn total_listeners(&self) -> u64 {
        self.channels.iter().map(|c| c.listeners).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(title: &str, listeners: u64) -> Channel {
        Channel {
            title: title.to_string(),
            listeners,
            ..Channel::default()
        }
    }

    fn directory() -> ChannelDirectory {
        ChannelDirectory::new(vec![
            channel("Groove Salad", 900),
            channel("Groove Salad Classic", 120),
            channel("Drone Zone", 450),
            channel("Deep Space One", 450),
        ])
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        let dir = directory();
        assert_eq!(dir.find("drone").unwrap().title, "Drone Zone");
        assert_eq!(dir.find("SPACE").unwrap().title, "Deep Space One");
    }

    #[test]
    fn test_find_first_match_wins() {
        let dir = directory();
        assert_eq!(dir.find("groove").unwrap().title, "Groove Salad");
        // Exact title of the later channel still resolves to the earlier one.
        assert_eq!(dir.find("Groove Salad").unwrap().title, "Groove Salad");
        assert_eq!(
            dir.find("Salad Classic").unwrap().title,
            "Groove Salad Classic"
        );
    }

    #[test]
    fn test_find_miss() {
        let dir = directory();
        match dir.find("Secret Agent") {
            Err(LookupError::NotFound(name)) => assert_eq!(name, "Secret Agent"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(ChannelDirectory::default().find("").is_err());
    }

    #[test]
    fn test_by_listeners_is_stable_descending() {
        let dir = directory();
        let titles: Vec<&str> = dir.by_listeners().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Groove Salad", "Drone Zone", "Deep Space One", "Groove Salad Classic"]
        );
        assert_eq!(dir.total_listeners(), 1920);
    }

    #[test]
    fn test_deserialize_directory_entry() {
        let json = r#"{
            "id": "groovesalad",
            "title": "Groove Salad",
            "description": "A nicely chilled plate of ambient beats.",
            "genre": "ambient|electronica",
            "listeners": "1234",
            "image": "https://api.somafm.com/img/groovesalad120.png",
            "xlimage": "https://api.somafm.com/logos/512/groovesalad512.png",
            "playlists": [
                {"url": "https://api.somafm.com/groovesalad130.pls", "format": "aac", "quality": "highest"},
                {"url": "https://api.somafm.com/groovesalad.pls", "format": "mp3", "quality": "high"}
            ],
            "lastPlaying": "ignored"
        }"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel.listeners, 1234);
        assert_eq!(channel.playlists.len(), 2);
        assert_eq!(
            channel.image_url(ImageField::XlImage),
            "https://api.somafm.com/logos/512/groovesalad512.png"
        );
        // largeimage is absent, so the next size is used.
        assert_eq!(
            channel.image_url(ImageField::LargeImage),
            "https://api.somafm.com/logos/512/groovesalad512.png"
        );
    }

    #[test]
    fn test_listeners_accepts_number() {
        let channel: Channel =
            serde_json::from_str(r#"{"title": "Lush", "listeners": 77}"#).unwrap();
        assert_eq!(channel.listeners, 77);
        assert!(serde_json::from_str::<Channel>(r#"{"title": "Lush", "listeners": "many"}"#).is_err());
    }
}
