use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::{IntroRecord, ReportCollection};

/// Episodes of one season, in the order they appear in the source report.
pub type SeasonEpisodes<'a> = Vec<&'a IntroRecord>;

/// Season number → episodes.
pub type Seasons<'a> = BTreeMap<i32, SeasonEpisodes<'a>>;

/// Lookup structures derived from a loaded [`ReportCollection`].
///
/// Built once per comparison run and never persisted. Borrows the collection,
/// so the collection cannot change while it is indexed.
#[derive(Debug)]
pub struct CollectionIndex<'a> {
    collection: &'a ReportCollection,
    by_id: HashMap<&'a str, &'a IntroRecord>,
    shows: BTreeMap<&'a str, Seasons<'a>>,
    duplicates: BTreeSet<&'a str>,
}

impl<'a> CollectionIndex<'a> {
    /// Index every record by episode id and by show/season.
    ///
    /// A repeated episode id keeps the last record in the identity index and
    /// is remembered in [`duplicates`](Self::duplicates). Both records stay in
    /// their season bucket. Empty ids are indexed like any other key.
    pub fn build(collection: &'a ReportCollection) -> Self {
        let mut by_id: HashMap<&'a str, &'a IntroRecord> = HashMap::new();
        let mut shows: BTreeMap<&'a str, Seasons<'a>> = BTreeMap::new();
        let mut duplicates = BTreeSet::new();

        for intro in &collection.intros {
            shows
                .entry(intro.series.as_str())
                .or_default()
                .entry(intro.season)
                .or_default()
                .push(intro);

            if by_id.insert(intro.episode_id.as_str(), intro).is_some() {
                duplicates.insert(intro.episode_id.as_str());
            }
        }

        Self {
            collection,
            by_id,
            shows,
            duplicates,
        }
    }

    pub fn collection(&self) -> &'a ReportCollection {
        self.collection
    }

    pub fn get(&self, episode_id: &str) -> Option<&'a IntroRecord> {
        self.by_id.get(episode_id).copied()
    }

    pub fn contains(&self, episode_id: &str) -> bool {
        self.by_id.contains_key(episode_id)
    }

    /// Number of distinct episode ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Episode ids that occurred more than once, sorted.
    pub fn duplicates(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.duplicates.iter().copied()
    }

    /// Every indexed episode id, in no particular order.
    pub fn episode_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_id.keys().copied()
    }

    /// Show names in lexicographic order.
    pub fn show_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.shows.keys().copied()
    }

    pub fn seasons(&self, show: &str) -> Option<&Seasons<'a>> {
        self.shows.get(show)
    }

    pub fn episodes(&self, show: &str, season: i32) -> &[&'a IntroRecord] {
        self.shows
            .get(show)
            .and_then(|seasons| seasons.get(&season))
            .map(|episodes| episodes.as_slice())
            .unwrap_or(&[])
    }

    /// All records of a show, season by season, each season in source order.
    pub fn show_records(&self, show: &str) -> Vec<&'a IntroRecord> {
        self.shows
            .get(show)
            .map(|seasons| seasons.values().flatten().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PluginConfiguration, ServerInfo};

    fn intro(id: &str, series: &str, season: i32, start: f64) -> IntroRecord {
        IntroRecord {
            episode_id: id.into(),
            series: series.into(),
            season,
            title: format!("Episode {id}"),
            intro_start: start,
            intro_end: start + 30.0,
            valid: true,
            ..Default::default()
        }
    }

    fn collection(intros: Vec<IntroRecord>) -> ReportCollection {
        ReportCollection {
            source: "test".into(),
            started_at: Default::default(),
            finished_at: Default::default(),
            runtime_nanos: 0,
            server_info: ServerInfo::default(),
            plugin_config: PluginConfiguration::default(),
            intros,
        }
    }

    #[test]
    fn empty_collection_yields_empty_indexes() {
        let c = collection(Vec::new());
        let idx = CollectionIndex::build(&c);
        assert!(idx.is_empty());
        assert_eq!(idx.show_names().count(), 0);
        assert!(idx.get("anything").is_none());
    }

    #[test]
    fn season_buckets_keep_source_order() {
        let c = collection(vec![
            intro("e3", "Show", 1, 3.0),
            intro("e1", "Show", 1, 1.0),
            intro("e9", "Show", 2, 9.0),
            intro("e2", "Show", 1, 2.0),
        ]);
        let idx = CollectionIndex::build(&c);
        let ids: Vec<&str> =
            idx.episodes("Show", 1).iter().map(|r| r.episode_id.as_str()).collect();
        assert_eq!(ids, vec!["e3", "e1", "e2"]);
        assert_eq!(idx.episodes("Show", 2).len(), 1);
        assert!(idx.episodes("Show", 3).is_empty());
    }

    #[test]
    fn shows_are_sorted() {
        let c = collection(vec![
            intro("a", "Zeta", 1, 0.0),
            intro("b", "Alpha", 1, 0.0),
            intro("c", "Mu", 1, 0.0),
        ]);
        let idx = CollectionIndex::build(&c);
        assert_eq!(idx.show_names().collect::<Vec<_>>(), vec!["Alpha", "Mu", "Zeta"]);
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let c = collection(vec![
            intro("dup", "Show", 1, 10.0),
            intro("other", "Show", 1, 0.0),
            intro("dup", "Show", 1, 20.0),
        ]);
        let idx = CollectionIndex::build(&c);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.get("dup").unwrap().intro_start, 20.0);
        assert_eq!(idx.duplicates().collect::<Vec<_>>(), vec!["dup"]);
        assert_eq!(idx.episodes("Show", 1).len(), 3);
    }

    #[test]
    fn empty_episode_id_is_indexed() {
        let c = collection(vec![intro("", "Show", 1, 5.0)]);
        let idx = CollectionIndex::build(&c);
        assert!(idx.contains(""));
        assert_eq!(idx.get("").unwrap().intro_start, 5.0);
    }

    #[test]
    fn show_records_flatten_seasons() {
        let c = collection(vec![
            intro("s2e1", "Show", 2, 0.0),
            intro("x", "Other", 1, 0.0),
            intro("s1e1", "Show", 1, 0.0),
            intro("s1e2", "Show", 1, 0.0),
        ]);
        let idx = CollectionIndex::build(&c);
        let ids: Vec<&str> =
            idx.show_records("Show").iter().map(|r| r.episode_id.as_str()).collect();
        assert_eq!(ids, vec!["s1e1", "s1e2", "s2e1"]);
        assert!(idx.show_records("Missing").is_empty());
    }
}
