//! Taxon records and their hierarchical grouping.
//!
//! A [`TaxonRecord`] is one row per taxon: the final identifier, the
//! grouping path from supergroup down to genus, the resolution category,
//! and the names of every primer able to detect the taxon.

use crate::error::{CoverError, CoverResult};

/// Resolution category used when every grouping level is filled in.
pub const RESOLUTION_SPECIES: &str = "Species";

/// Grouping levels that can leave a record unresolved, from coarse to fine.
pub const RESOLUTION_LEVELS: [&str; 4] = ["Phylum", "Order", "Family", "Genus"];

/// Ordered hierarchical grouping attributes of a taxon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaxonGrouping {
    /// Top of the hierarchy.
    #[cfg_attr(feature = "serde", serde(rename = "Supergroup", default))]
    pub supergroup: String,
    /// Taxa group; the level used for per-group coverage.
    #[cfg_attr(feature = "serde", serde(rename = "Taxa_group", default))]
    pub taxa_group: String,
    /// Phylum.
    #[cfg_attr(feature = "serde", serde(rename = "Phylum", default))]
    pub phylum: String,
    /// Order.
    #[cfg_attr(feature = "serde", serde(rename = "Order", default))]
    pub order: String,
    /// Family.
    #[cfg_attr(feature = "serde", serde(rename = "Family", default))]
    pub family: String,
    /// Genus.
    #[cfg_attr(feature = "serde", serde(rename = "Genus", default))]
    pub genus: String,
}

impl TaxonGrouping {
    /// Returns the grouping values from supergroup to genus.
    pub fn path(&self) -> [&str; 6] {
        [
            &self.supergroup,
            &self.taxa_group,
            &self.phylum,
            &self.order,
            &self.family,
            &self.genus,
        ]
    }

    /// Infers the resolution category from the first blank level.
    ///
    /// Returns the name of the first of phylum, order, family and genus
    /// that is blank, or [`RESOLUTION_SPECIES`] if all of them are set.
    pub fn infer_resolution(&self) -> &'static str {
        let levels = [&self.phylum, &self.order, &self.family, &self.genus];
        levels
            .iter()
            .zip(RESOLUTION_LEVELS)
            .find(|(value, _)| value.is_empty())
            .map(|(_, name)| name)
            .unwrap_or(RESOLUTION_SPECIES)
    }
}

/// One taxon with the primers able to detect it.
///
/// Records are immutable once built; the search engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTaxonRecord"))]
pub struct TaxonRecord {
    /// Stable final identifier, unique per taxon.
    #[cfg_attr(feature = "serde", serde(rename = "Final_ID"))]
    pub final_id: String,
    /// Hierarchical grouping attributes.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub grouping: TaxonGrouping,
    /// Resolution category (species, genus, family, ...).
    #[cfg_attr(feature = "serde", serde(rename = "Resolution"))]
    pub resolution: String,
    /// Names of the primers that detect this taxon.
    pub primers: Vec<String>,
}

impl TaxonRecord {
    /// Starts building a record for the given final identifier.
    pub fn builder(final_id: impl Into<String>) -> TaxonRecordBuilder {
        TaxonRecordBuilder::new(final_id)
    }

    /// Returns the taxa group used for per-group coverage.
    pub fn taxa_group(&self) -> &str {
        &self.grouping.taxa_group
    }

    /// Returns true if the named primer detects this taxon.
    pub fn is_detected_by(&self, primer: &str) -> bool {
        self.primers.iter().any(|p| p == primer)
    }

    /// Returns the tree key of this record: `root-<path>-<final id>-leaf`.
    pub fn key(&self) -> String {
        let mut key = String::from("root");
        for part in self.grouping.path() {
            key.push('-');
            key.push_str(part);
        }
        key.push('-');
        key.push_str(&self.final_id);
        key.push_str("-leaf");
        key
    }
}

/// Dataset row as it arrives on the wire, before normalization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTaxonRecord {
    #[serde(rename = "Final_ID")]
    final_id: String,
    #[serde(flatten)]
    grouping: TaxonGrouping,
    #[serde(rename = "Resolution", default)]
    resolution: Option<String>,
    #[serde(default)]
    primers: Vec<String>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTaxonRecord> for TaxonRecord {
    type Error = CoverError;

    fn try_from(raw: RawTaxonRecord) -> CoverResult<Self> {
        let RawTaxonRecord {
            final_id,
            grouping,
            resolution,
            primers,
        } = raw;
        let mut builder = TaxonRecordBuilder {
            final_id,
            grouping,
            resolution: None,
            primers,
        };
        if let Some(resolution) = resolution {
            builder = builder.resolution(resolution);
        }
        builder.build()
    }
}

/// Builder for [`TaxonRecord`].
///
/// Trims every field, replaces spaces in the final identifier with
/// underscores, drops duplicate primer names and infers the resolution
/// category when none is given.
#[derive(Debug, Clone, Default)]
pub struct TaxonRecordBuilder {
    final_id: String,
    grouping: TaxonGrouping,
    resolution: Option<String>,
    primers: Vec<String>,
}

impl TaxonRecordBuilder {
    fn new(final_id: impl Into<String>) -> Self {
        Self {
            final_id: final_id.into(),
            ..Self::default()
        }
    }

    /// Sets the supergroup.
    pub fn supergroup(mut self, value: impl Into<String>) -> Self {
        self.grouping.supergroup = value.into();
        self
    }

    /// Sets the taxa group.
    pub fn taxa_group(mut self, value: impl Into<String>) -> Self {
        self.grouping.taxa_group = value.into();
        self
    }

    /// Sets the phylum.
    pub fn phylum(mut self, value: impl Into<String>) -> Self {
        self.grouping.phylum = value.into();
        self
    }

    /// Sets the order.
    pub fn order(mut self, value: impl Into<String>) -> Self {
        self.grouping.order = value.into();
        self
    }

    /// Sets the family.
    pub fn family(mut self, value: impl Into<String>) -> Self {
        self.grouping.family = value.into();
        self
    }

    /// Sets the genus.
    pub fn genus(mut self, value: impl Into<String>) -> Self {
        self.grouping.genus = value.into();
        self
    }

    /// Sets an explicit resolution category.
    pub fn resolution(mut self, value: impl Into<String>) -> Self {
        self.resolution = Some(value.into());
        self
    }

    /// Adds a detecting primer.
    pub fn primer(mut self, name: impl Into<String>) -> Self {
        self.primers.push(name.into());
        self
    }

    /// Adds several detecting primers.
    pub fn primers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Builds the record.
    ///
    /// # Errors
    ///
    /// Returns [`CoverError::EmptyFinalId`] if the final identifier is blank.
    pub fn build(self) -> CoverResult<TaxonRecord> {
        let final_id = self.final_id.trim().replace(' ', "_");
        if final_id.is_empty() {
            return Err(CoverError::EmptyFinalId);
        }

        let g = self.grouping;
        let grouping = TaxonGrouping {
            supergroup: g.supergroup.trim().to_string(),
            taxa_group: g.taxa_group.trim().to_string(),
            phylum: g.phylum.trim().to_string(),
            order: g.order.trim().to_string(),
            family: g.family.trim().to_string(),
            genus: g.genus.trim().to_string(),
        };

        let mut primers: Vec<String> = Vec::with_capacity(self.primers.len());
        for name in self.primers {
            let name = name.trim();
            if !name.is_empty() && !primers.iter().any(|p| p == name) {
                primers.push(name.to_string());
            }
        }

        let resolution = match self.resolution {
            Some(r) if !r.trim().is_empty() => r.trim().to_string(),
            _ => grouping.infer_resolution().to_string(),
        };

        Ok(TaxonRecord {
            final_id,
            grouping,
            resolution,
            primers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_grouping() -> TaxonGrouping {
        TaxonGrouping {
            supergroup: "Eukaryota".to_string(),
            taxa_group: "Fish".to_string(),
            phylum: "Chordata".to_string(),
            order: "Salmoniformes".to_string(),
            family: "Salmonidae".to_string(),
            genus: "Salmo".to_string(),
        }
    }

    #[test]
    fn test_infer_resolution_species() {
        assert_eq!(full_grouping().infer_resolution(), RESOLUTION_SPECIES);
    }

    #[test]
    fn test_infer_resolution_first_blank_level() {
        let mut grouping = full_grouping();
        grouping.genus.clear();
        assert_eq!(grouping.infer_resolution(), "Genus");

        grouping.order.clear();
        assert_eq!(grouping.infer_resolution(), "Order");
    }

    #[test]
    fn test_builder_normalizes_fields() {
        let record = TaxonRecord::builder(" Salmo trutta ")
            .supergroup(" Eukaryota")
            .taxa_group("Fish ")
            .phylum("Chordata")
            .order("Salmoniformes")
            .family("Salmonidae")
            .genus("Salmo")
            .primers([" MiFish-U", "MiFish-U", "Teleo", " "])
            .build()
            .unwrap();

        assert_eq!(record.final_id, "Salmo_trutta");
        assert_eq!(record.grouping.supergroup, "Eukaryota");
        assert_eq!(record.taxa_group(), "Fish");
        assert_eq!(record.primers, vec!["MiFish-U", "Teleo"]);
        assert_eq!(record.resolution, RESOLUTION_SPECIES);
    }

    #[test]
    fn test_builder_keeps_explicit_resolution() {
        let record = TaxonRecord::builder("Salmonidae_sp")
            .family("Salmonidae")
            .resolution("Family")
            .build()
            .unwrap();
        assert_eq!(record.resolution, "Family");
    }

    #[test]
    fn test_builder_rejects_blank_final_id() {
        let err = TaxonRecord::builder("   ").build().unwrap_err();
        assert_eq!(err, CoverError::EmptyFinalId);
    }

    #[test]
    fn test_is_detected_by() {
        let record = TaxonRecord::builder("Salmo_trutta")
            .primer("Teleo")
            .build()
            .unwrap();
        assert!(record.is_detected_by("Teleo"));
        assert!(!record.is_detected_by("MiFish-U"));
    }

    #[test]
    fn test_key() {
        let record = TaxonRecord {
            final_id: "Salmo_trutta".to_string(),
            grouping: full_grouping(),
            resolution: RESOLUTION_SPECIES.to_string(),
            primers: vec![],
        };
        assert_eq!(
            record.key(),
            "root-Eukaryota-Fish-Chordata-Salmoniformes-Salmonidae-Salmo-Salmo_trutta-leaf"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_infers_missing_resolution() {
        let json = r#"{"Final_ID":" Salmo trutta ","Phylum":"Chordata","Order":"Salmoniformes","Family":"Salmonidae","primers":["Teleo","Teleo "," "]}"#;
        let record: TaxonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.final_id, "Salmo_trutta");
        assert_eq!(record.resolution, "Genus");
        assert_eq!(record.primers, vec!["Teleo".to_string()]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_blank_final_id() {
        let err = serde_json::from_str::<TaxonRecord>(r#"{"Final_ID":"  ","primers":["A"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("empty final identifier"), "{}", err);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_dataset_column_names() {
        let json = r#"{"Final_ID":"Salmo_trutta","Supergroup":"Eukaryota","Taxa_group":"Fish","Resolution":"Genus","primers":["Teleo"]}"#;
        let record: TaxonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.final_id, "Salmo_trutta");
        assert_eq!(record.taxa_group(), "Fish");
        assert_eq!(record.grouping.phylum, "");
        assert_eq!(record.resolution, "Genus");

        let value: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["Final_ID"], "Salmo_trutta");
        assert_eq!(value["Taxa_group"], "Fish");
        assert_eq!(value["primers"][0], "Teleo");
    }
}
