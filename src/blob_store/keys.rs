/// Storage key layout for gallery photos
///
/// Photo objects have been written under several key layouts over time.
/// Deletion walks the candidate list in order; new uploads always use the
/// primary key, which is the first candidate.

/// Maps a photo to the object keys it may live under
pub trait StorageKeyResolver: Send + Sync {
    /// Key used when writing a new photo
    fn primary_key(&self, gallery_id: &str, name: &str) -> String;

    /// Ordered candidate keys for an existing photo
    fn candidates(&self, gallery_id: &str, name: &str) -> Vec<String>;
}

/// Every layout the gallery has written photos under, newest first
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyKeyLayout;

impl StorageKeyResolver for LegacyKeyLayout {
    fn primary_key(&self, gallery_id: &str, name: &str) -> String {
        format!("gallery-photos/{}/{}", gallery_id, name)
    }

    fn candidates(&self, gallery_id: &str, name: &str) -> Vec<String> {
        vec![
            self.primary_key(gallery_id, name),
            format!("galleries/{}/photos/{}", gallery_id, name),
            format!("galleries/{}/{}", gallery_id, name),
            format!("galleries/{}", name),
            format!("gallery-photos/{}", name),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_order_is_stable() {
        let candidates = LegacyKeyLayout.candidates("g1", "kiss.jpg");
        assert_eq!(
            candidates,
            vec![
                "gallery-photos/g1/kiss.jpg",
                "galleries/g1/photos/kiss.jpg",
                "galleries/g1/kiss.jpg",
                "galleries/kiss.jpg",
                "gallery-photos/kiss.jpg",
            ]
        );
    }

    #[test]
    fn test_primary_key_is_first_candidate() {
        let layout = LegacyKeyLayout;
        assert_eq!(
            layout.primary_key("g1", "a.jpg"),
            layout.candidates("g1", "a.jpg")[0]
        );
    }
}
