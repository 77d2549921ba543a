//! Records and views produced by the query layer.
//!
//! Views are plain data: joins happen explicitly in the store or feed
//! backends, which then assemble these values. Optional extension records
//! (agency localisation, stop translations) are modelled as `Option` and
//! resolved through a single fallback policy so no access can fail.

use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Language keys used to resolve the names of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameLanguage {
    /// Japanese display name (`ja`).
    Japanese,
    /// Katakana reading (`kana`).
    Kana,
    /// English name (`en`).
    English,
}

impl NameLanguage {
    /// Every language key the stop view resolves.
    pub const ALL: [Self; 3] = [Self::Japanese, Self::Kana, Self::English];

    /// Key stored in the translation record.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Japanese => "ja",
            Self::Kana => "kana",
            Self::English => "en",
        }
    }

    /// Parse a translation language key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| language.key() == key)
    }
}

/// Japanese extension fields attached to an agency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgencyLocalization {
    /// Postal code of the agency office.
    pub zip_number: Option<String>,
    /// Name of the agency president.
    pub president_name: Option<String>,
}

/// Agency joined with its optional localisation.
///
/// # Examples
/// ```
/// use noriba_core::{Agency, AgencyLocalization};
///
/// let bare = Agency::new("A1", "Test Railway", None);
/// assert_eq!(bare.zip_number, None);
///
/// let localised = Agency::new(
///     "A1",
///     "Test Railway",
///     Some(AgencyLocalization {
///         zip_number: Some("1000001".into()),
///         president_name: None,
///     }),
/// );
/// assert_eq!(localised.zip_number.as_deref(), Some("1000001"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Agency {
    /// Natural identifier (`agency_id`).
    pub id: String,
    /// Display name (`agency_name`).
    pub name: String,
    /// Postal code from `agency_jp.txt`, when present.
    pub zip_number: Option<String>,
    /// President name from `agency_jp.txt`, when present.
    pub president_name: Option<String>,
}

impl Agency {
    /// Build the view from the base record and its optional localisation.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        localization: Option<AgencyLocalization>,
    ) -> Self {
        let localization = localization.unwrap_or_default();
        Self {
            id: id.into(),
            name: name.into(),
            zip_number: localization.zip_number,
            president_name: localization.president_name,
        }
    }
}

/// A translation row in either the GTFS-JP legacy or the GTFS layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Legacy key: the Japanese text being translated.
    pub trans_id: Option<String>,
    /// Language key (`lang`, or `language` in the GTFS layout).
    pub language: Option<String>,
    /// Translated text.
    pub translation: String,
    /// GTFS layout: translated table.
    pub table_name: Option<String>,
    /// GTFS layout: translated field.
    pub field_name: Option<String>,
    /// GTFS layout: identifier of the translated record.
    pub record_id: Option<String>,
    /// GTFS layout: original field value being translated.
    pub field_value: Option<String>,
}

impl Translation {
    /// Whether this row translates the name of the given stop.
    ///
    /// Legacy rows match on `trans_id == stop_name`; GTFS rows must target
    /// `stops.stop_name` and match either the stop id or the original name.
    #[must_use]
    pub fn applies_to_stop(&self, stop_id: &str, stop_name: Option<&str>) -> bool {
        if let (Some(trans_id), Some(name)) = (self.trans_id.as_deref(), stop_name)
            && trans_id == name
        {
            return true;
        }
        let targets_stop_names = self.table_name.as_deref() == Some("stops")
            && self.field_name.as_deref() == Some("stop_name");
        targets_stop_names
            && (self.record_id.as_deref() == Some(stop_id)
                || (stop_name.is_some() && self.field_value.as_deref() == stop_name))
    }
}

/// Translations grouped by the keys a stop is matched on.
///
/// Built once per query; rows come back in their original order so the first
/// translation per language still wins.
///
/// # Examples
/// ```
/// use noriba_core::{Translation, TranslationIndex};
///
/// let index: TranslationIndex = [Translation {
///     trans_id: Some("東京".into()),
///     language: Some("en".into()),
///     translation: "Tokyo".into(),
///     ..Translation::default()
/// }]
/// .into_iter()
/// .collect();
/// let names = index.names("S1", Some("東京")).resolve(Some("東京"));
/// assert_eq!(names.en_name, "Tokyo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TranslationIndex {
    rows: Vec<Translation>,
    by_trans_id: HashMap<String, Vec<usize>>,
    by_record_id: HashMap<String, Vec<usize>>,
    by_field_value: HashMap<String, Vec<usize>>,
}

impl TranslationIndex {
    /// Translations applying to a stop, in their original order.
    pub fn for_stop<'a>(
        &'a self,
        stop_id: &'a str,
        stop_name: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Translation> + 'a {
        let mut positions: Vec<usize> = [
            indexed(&self.by_trans_id, stop_name),
            indexed(&self.by_record_id, Some(stop_id)),
            indexed(&self.by_field_value, stop_name),
        ]
        .concat();
        positions.sort_unstable();
        positions.dedup();
        positions
            .into_iter()
            .filter_map(|position| self.rows.get(position))
            .filter(move |row| row.applies_to_stop(stop_id, stop_name))
    }

    /// Names of one stop, collected from the matching translations.
    #[must_use]
    pub fn names(&self, stop_id: &str, stop_name: Option<&str>) -> StopNames {
        StopNames::collect(stop_id, stop_name, self.for_stop(stop_id, stop_name))
    }

    /// Number of indexed translations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no translation was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push(&mut self, row: Translation) {
        let position = self.rows.len();
        if let Some(trans_id) = &row.trans_id {
            self.by_trans_id
                .entry(trans_id.clone())
                .or_default()
                .push(position);
        }
        if row.table_name.as_deref() == Some("stops") && row.field_name.as_deref() == Some("stop_name")
        {
            if let Some(record_id) = &row.record_id {
                self.by_record_id
                    .entry(record_id.clone())
                    .or_default()
                    .push(position);
            }
            if let Some(field_value) = &row.field_value {
                self.by_field_value
                    .entry(field_value.clone())
                    .or_default()
                    .push(position);
            }
        }
        self.rows.push(row);
    }
}

fn indexed<'m>(map: &'m HashMap<String, Vec<usize>>, key: Option<&str>) -> &'m [usize] {
    key.and_then(|key| map.get(key))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

impl FromIterator<Translation> for TranslationIndex {
    fn from_iter<T: IntoIterator<Item = Translation>>(iter: T) -> Self {
        let mut index = Self::default();
        for row in iter {
            index.push(row);
        }
        index
    }
}

/// Names collected for a stop, one per language key.
///
/// The first translation seen for a language wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopNames {
    japanese: Option<String>,
    kana: Option<String>,
    english: Option<String>,
}

impl StopNames {
    /// Collect the names of one stop from a translation sequence.
    pub fn collect<'a, I>(stop_id: &str, stop_name: Option<&str>, translations: I) -> Self
    where
        I: IntoIterator<Item = &'a Translation>,
    {
        let mut names = Self::default();
        for translation in translations {
            if translation.applies_to_stop(stop_id, stop_name)
                && let Some(language) = translation.language.as_deref()
            {
                names.record(language, &translation.translation);
            }
        }
        names
    }

    /// Record a translation unless the language already has one.
    ///
    /// Unknown language keys are ignored.
    pub fn record(&mut self, language: &str, translation: &str) {
        let Some(language) = NameLanguage::from_key(language) else {
            return;
        };
        let slot = match language {
            NameLanguage::Japanese => &mut self.japanese,
            NameLanguage::Kana => &mut self.kana,
            NameLanguage::English => &mut self.english,
        };
        if slot.is_none() {
            *slot = Some(translation.to_owned());
        }
    }

    /// Translation recorded for a language, if any.
    #[must_use]
    pub fn get(&self, language: NameLanguage) -> Option<&str> {
        match language {
            NameLanguage::Japanese => self.japanese.as_deref(),
            NameLanguage::Kana => self.kana.as_deref(),
            NameLanguage::English => self.english.as_deref(),
        }
    }

    /// Apply the fallback policy for missing translations.
    ///
    /// The display name falls back to the raw `stop_name`, then to the empty
    /// string. Kana and English names fall back to the empty string.
    ///
    /// # Examples
    /// ```
    /// use noriba_core::StopNames;
    ///
    /// let mut names = StopNames::default();
    /// names.record("en", "Tokyo");
    /// let resolved = names.resolve(Some("東京"));
    /// assert_eq!(resolved.name, "東京");
    /// assert_eq!(resolved.kana, "");
    /// assert_eq!(resolved.en_name, "Tokyo");
    /// ```
    #[must_use]
    pub fn resolve(self, stop_name: Option<&str>) -> ResolvedNames {
        ResolvedNames {
            name: self
                .japanese
                .or_else(|| stop_name.map(str::to_owned))
                .unwrap_or_default(),
            kana: self.kana.unwrap_or_default(),
            en_name: self.english.unwrap_or_default(),
        }
    }
}

/// Stop names after the fallback policy has been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedNames {
    /// Display name.
    pub name: String,
    /// Kana reading.
    pub kana: String,
    /// English name.
    pub en_name: String,
}

/// Distinct trip identifiers in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripIds {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl TripIds {
    /// Add a trip id unless it was already seen.
    pub fn push(&mut self, trip_id: &str) {
        if !self.seen.contains(trip_id) {
            self.seen.insert(trip_id.to_owned());
            self.ids.push(trip_id.to_owned());
        }
    }

    /// Number of distinct trips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no trip references the stop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Consume the set, returning ids in first-encountered order.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.ids
    }
}

impl<S: AsRef<str>> FromIterator<S> for TripIds {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut ids = Self::default();
        for trip_id in iter {
            ids.push(trip_id.as_ref());
        }
        ids
    }
}

/// Stop view with resolved names and optional referencing trips.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stop {
    /// Natural identifier (`stop_id`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Kana reading.
    pub kana: String,
    /// English name.
    pub en_name: String,
    /// Distinct referencing trips, present only when requested.
    pub trip_ids: Option<Vec<String>>,
}

impl Stop {
    /// Assemble a stop view.
    pub fn new(id: impl Into<String>, names: ResolvedNames, trip_ids: Option<TripIds>) -> Self {
        Self {
            id: id.into(),
            name: names.name,
            kana: names.kana,
            en_name: names.en_name,
            trip_ids: trip_ids.map(TripIds::into_vec),
        }
    }
}

/// Case-insensitive substring containment used by name search.
///
/// # Examples
/// ```
/// use noriba_core::name_matches;
///
/// assert!(name_matches("Tokyo Station", "tokyo"));
/// assert!(name_matches("東京駅", "東京"));
/// assert!(!name_matches("Osaka", "kyo"));
/// ```
#[must_use]
pub fn name_matches(display_name: &str, word: &str) -> bool {
    display_name.to_lowercase().contains(&word.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn legacy(trans_id: &str, lang: &str, text: &str) -> Translation {
        Translation {
            trans_id: Some(trans_id.into()),
            language: Some(lang.into()),
            translation: text.into(),
            ..Translation::default()
        }
    }

    #[fixture]
    fn tokyo_translations() -> Vec<Translation> {
        vec![
            legacy("東京", "ja", "東京"),
            legacy("東京", "ja-Hrkt", "とうきょう"),
            legacy("東京", "kana", "トウキョウ"),
            legacy("東京", "en", "Tokyo"),
            legacy("品川", "en", "Shinagawa"),
        ]
    }

    #[rstest]
    fn collects_names_for_matching_stop(tokyo_translations: Vec<Translation>) {
        let names = StopNames::collect("S1", Some("東京"), &tokyo_translations);
        let resolved = names.resolve(Some("東京"));
        assert_eq!(resolved.name, "東京");
        assert_eq!(resolved.kana, "トウキョウ");
        assert_eq!(resolved.en_name, "Tokyo");
    }

    #[rstest]
    fn first_translation_per_language_wins() {
        let rows = [legacy("駅", "en", "Station"), legacy("駅", "en", "Depot")];
        let names = StopNames::collect("S1", Some("駅"), &rows);
        assert_eq!(names.get(NameLanguage::English), Some("Station"));
    }

    #[rstest]
    fn gtfs_layout_matches_by_record_id() {
        let row = Translation {
            table_name: Some("stops".into()),
            field_name: Some("stop_name".into()),
            language: Some("en".into()),
            record_id: Some("S9".into()),
            translation: "Harbour".into(),
            ..Translation::default()
        };
        assert!(row.applies_to_stop("S9", None));
        assert!(!row.applies_to_stop("S8", Some("港")));
    }

    #[rstest]
    fn gtfs_layout_matches_by_field_value() {
        let row = Translation {
            table_name: Some("stops".into()),
            field_name: Some("stop_name".into()),
            language: Some("en".into()),
            field_value: Some("港".into()),
            translation: "Harbour".into(),
            ..Translation::default()
        };
        assert!(row.applies_to_stop("S8", Some("港")));
        assert!(!row.applies_to_stop("S8", None));
    }

    #[rstest]
    fn gtfs_layout_ignores_other_fields() {
        let row = Translation {
            table_name: Some("stops".into()),
            field_name: Some("stop_desc".into()),
            language: Some("en".into()),
            record_id: Some("S9".into()),
            translation: "Harbour".into(),
            ..Translation::default()
        };
        assert!(!row.applies_to_stop("S9", None));
    }

    #[rstest]
    #[case(None, "")]
    #[case(Some("新宿"), "新宿")]
    fn missing_japanese_name_falls_back(#[case] stop_name: Option<&str>, #[case] expected: &str) {
        let resolved = StopNames::default().resolve(stop_name);
        assert_eq!(resolved.name, expected);
        assert!(resolved.kana.is_empty());
        assert!(resolved.en_name.is_empty());
    }

    #[rstest]
    fn trip_ids_keep_first_encountered_order() {
        let ids: TripIds = ["T2", "T1", "T2", "T3", "T1"].into_iter().collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids.into_vec(), vec!["T2", "T1", "T3"]);
    }

    #[rstest]
    fn trip_ids_collapse_many_repeats() {
        let ids: TripIds = (0..20_000).map(|n| format!("T{}", n % 500)).collect();
        assert_eq!(ids.len(), 500);
        let ids = ids.into_vec();
        assert_eq!(ids.first().map(String::as_str), Some("T0"));
        assert_eq!(ids.last().map(String::as_str), Some("T499"));
    }

    fn gtfs(record_id: Option<&str>, field_value: Option<&str>, lang: &str, text: &str) -> Translation {
        Translation {
            table_name: Some("stops".into()),
            field_name: Some("stop_name".into()),
            language: Some(lang.into()),
            record_id: record_id.map(Into::into),
            field_value: field_value.map(Into::into),
            translation: text.into(),
            ..Translation::default()
        }
    }

    #[rstest]
    fn index_yields_matching_rows_in_original_order() {
        let index: TranslationIndex = [
            gtfs(Some("S1"), None, "en", "Tokyo Station"),
            legacy("東京", "en", "Tokyo"),
            legacy("品川", "en", "Shinagawa"),
            gtfs(None, Some("東京"), "kana", "トウキョウ"),
            gtfs(Some("S1"), Some("東京"), "ja", "東京駅"),
        ]
        .into_iter()
        .collect();
        let texts: Vec<&str> = index
            .for_stop("S1", Some("東京"))
            .map(|row| row.translation.as_str())
            .collect();
        assert_eq!(texts, ["Tokyo Station", "Tokyo", "トウキョウ", "東京駅"]);
        let names = index.names("S1", Some("東京"));
        assert_eq!(names.get(NameLanguage::English), Some("Tokyo Station"));
    }

    #[rstest]
    fn index_agrees_with_a_full_scan(tokyo_translations: Vec<Translation>) {
        let index: TranslationIndex = tokyo_translations.iter().cloned().collect();
        assert_eq!(index.len(), tokyo_translations.len());
        for (id, name) in [("S1", Some("東京")), ("S2", Some("品川")), ("S3", None)] {
            assert_eq!(
                index.names(id, name),
                StopNames::collect(id, name, &tokyo_translations)
            );
        }
    }

    #[rstest]
    #[case("Tokyo", "TOKYO", true)]
    #[case("Ünter", "ünt", true)]
    #[case("Tokyo", "", true)]
    #[case("Tokyo", "Kyoto", false)]
    fn name_matching_ignores_case(#[case] name: &str, #[case] word: &str, #[case] expected: bool) {
        assert_eq!(name_matches(name, word), expected);
    }
}
