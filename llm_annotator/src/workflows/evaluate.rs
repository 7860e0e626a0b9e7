//! Summary statistics over an annotated dataset.

use crate::{
    dataset::{DatasetError, FieldKeys, Publication},
    workflows::annotate::count_matching,
};

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("there is no metadata in the provided annotated json file")]
    NoPublications,
    #[error("the configuration implies that no evaluation data exists in the dataset; evaluation is not possible")]
    NoEvaluationData,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub avg: f64,
    pub min: usize,
    pub max: usize,
}

impl Stats {
    /// `None` for an empty input.
    pub fn from_counts<I: IntoIterator<Item = usize>>(counts: I) -> Option<Self> {
        let mut counts = counts.into_iter();
        let first = counts.next()?;
        let (mut sum, mut n, mut min, mut max) = (first, 1usize, first, first);
        for count in counts {
            sum += count;
            n += 1;
            min = min.min(count);
            max = max.max(count);
        }
        Some(Self {
            avg: sum as f64 / n as f64,
            min,
            max,
        })
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Avg: {}", self.avg)?;
        writeln!(f, "Min: {}", self.min)?;
        write!(f, "Max: {}", self.max)
    }
}

/// Number of annotated targets per publication.
pub fn targets_count_stats(
    publications: &[Publication],
    keys: &FieldKeys,
) -> Result<Stats, EvaluationError> {
    let counts = publications
        .iter()
        .map(|publication| publication.annotation(keys).map(|targets| targets.len()))
        .collect::<Result<Vec<_>, _>>()?;
    Stats::from_counts(counts).ok_or(EvaluationError::NoPublications)
}

/// Number of annotated targets per publication that also appear in its evaluation data.
pub fn matching_targets_count_stats(
    publications: &[Publication],
    keys: &FieldKeys,
) -> Result<Stats, EvaluationError> {
    let counts = publications
        .iter()
        .map(|publication| -> Result<usize, EvaluationError> {
            let annotated = publication.annotation(keys)?;
            let ground_truth = publication
                .ground_truth(keys)?
                .ok_or(EvaluationError::NoEvaluationData)?;
            Ok(count_matching(&annotated, &ground_truth))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Stats::from_counts(counts).ok_or(EvaluationError::NoPublications)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub publications: usize,
    pub targets_count: Stats,
    pub matching_count: Stats,
}

impl EvaluationReport {
    pub fn build(publications: &[Publication], keys: &FieldKeys) -> Result<Self, EvaluationError> {
        if keys.evaluation_data.is_none() {
            return Err(EvaluationError::NoEvaluationData);
        }
        if publications.is_empty() {
            return Err(EvaluationError::NoPublications);
        }
        Ok(Self {
            publications: publications.len(),
            targets_count: targets_count_stats(publications, keys)?,
            matching_count: matching_targets_count_stats(publications, keys)?,
        })
    }
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Evaluating data for {} documents.", self.publications)?;
        writeln!(f, "Evaluation of the number of found targets:")?;
        writeln!(f, "{}", self.targets_count)?;
        writeln!(
            f,
            "Evaluation of the number of correct targets according to the provided evaluation data:"
        )?;
        write!(f, "{}", self.matching_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys() -> FieldKeys {
        FieldKeys {
            document: "abstract".to_owned(),
            annotation: "annotated".to_owned(),
            evaluation_data: Some("subjects".to_owned()),
        }
    }

    fn annotated() -> Vec<Publication> {
        serde_json::from_value(json!([
            {"annotated": ["Robotics", "Internet"], "subjects": ["Robotics"]},
            {"annotated": ["Software"], "subjects": ["Databases"]},
            {"annotated": ["A", "B", "C"], "subjects": ["A", "C"]}
        ]))
        .unwrap()
    }

    #[test]
    fn stats_from_counts() {
        assert_eq!(
            Stats::from_counts([2, 1, 3]),
            Some(Stats {
                avg: 2.0,
                min: 1,
                max: 3
            })
        );
        assert_eq!(Stats::from_counts(Vec::new()), None);
    }

    #[test]
    fn report_reduces_both_counts() {
        let report = EvaluationReport::build(&annotated(), &keys()).unwrap();
        assert_eq!(report.publications, 3);
        assert_eq!(report.targets_count.min, 1);
        assert_eq!(report.targets_count.max, 3);
        assert_eq!(report.matching_count.avg, 1.0);
        assert_eq!(report.matching_count.min, 0);
        assert_eq!(report.matching_count.max, 2);

        let rendered = report.to_string();
        assert!(rendered.starts_with("Evaluating data for 3 documents.\n"));
        assert!(rendered.contains("Avg: 2\nMin: 1\nMax: 3"));
    }

    #[test]
    fn report_needs_publications_and_evaluation_data() {
        assert!(matches!(
            EvaluationReport::build(&[], &keys()),
            Err(EvaluationError::NoPublications)
        ));
        let keys = FieldKeys {
            evaluation_data: None,
            ..keys()
        };
        assert!(matches!(
            EvaluationReport::build(&annotated(), &keys),
            Err(EvaluationError::NoEvaluationData)
        ));
    }

    #[test]
    fn unannotated_records_are_dataset_errors() {
        let publications: Vec<Publication> =
            serde_json::from_value(json!([{"subjects": ["A"]}])).unwrap();
        assert!(matches!(
            targets_count_stats(&publications, &keys()),
            Err(EvaluationError::Dataset(DatasetError::MissingField { .. }))
        ));
    }
}
