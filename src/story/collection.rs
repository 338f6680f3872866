use crate::{
    assets::probe::DurationProbe,
    foundation::core::MediaDuration,
    foundation::error::StoryResult,
    story::page::Page,
};

/// Ordered, read-only sequence of pages.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PageCollection {
    pages: Vec<Page>,
}

impl PageCollection {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Page> {
        self.pages.iter()
    }

    pub fn as_slice(&self) -> &[Page] {
        &self.pages
    }

    /// Sum of every page's narration length. Fails on the first unavailable narration.
    pub fn total_duration(&self, probe: &dyn DurationProbe) -> StoryResult<MediaDuration> {
        self.pages.iter().map(|p| p.duration(probe)).sum()
    }
}

impl FromIterator<Page> for PageCollection {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PageCollection {
    type Item = &'a Page;
    type IntoIter = std::slice::Iter<'a, Page>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}
