//! Response shapes of the character collection endpoint.

use serde::{Deserialize, Serialize};

/// One page of the character collection.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub info: Info,
    pub results: Vec<Character>,
}

/// Paging metadata. `next`/`prev` are `null` at either end of the collection.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Info {
    pub count: u64,
    pub pages: u64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: String,
    pub origin: Place,
    pub location: Place,
    pub image: String,
    pub episode: Vec<String>,
    pub url: String,
    pub created: String,
}

/// A named link to another resource (origin or last known location).
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Place {
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_page() {
        let raw = r#"{
            "info": {
                "count": 826,
                "pages": 42,
                "next": "https://example.test/?page=3",
                "prev": null
            },
            "results": [{
                "id": 21,
                "name": "Aqua Morty",
                "status": "unknown",
                "species": "Humanoid",
                "type": "Fish-Person",
                "gender": "Male",
                "origin": {"name": "unknown", "url": ""},
                "location": {"name": "Citadel of Ricks", "url": "https://example.test/location/3"},
                "image": "https://example.test/avatar/21.jpeg",
                "episode": ["https://example.test/episode/10"],
                "url": "https://example.test/character/21",
                "created": "2017-11-04T22:39:48.055Z"
            }]
        }"#;

        let page: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(page.info.count, 826);
        assert_eq!(page.info.prev, None);
        assert_eq!(page.results[0].kind, "Fish-Person");
        assert_eq!(page.results[0].location.name, "Citadel of Ricks");
    }
}
