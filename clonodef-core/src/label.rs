use crate::pool::OptionEntry;
use crate::types::ColumnRef;

pub const FALLBACK_LABEL: &str = "Select Clonotype Definition";

const NOISE: &str = "InFrame";

/// Default block label for the selected definition columns, in selection order.
pub fn compute_default_label<S: AsRef<str>>(labels: &[S]) -> String {
    let parts: Vec<String> = labels
        .iter()
        .map(|label| label.as_ref().replacen(NOISE, "", 1).trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();

    let joined = parts.join("-");
    if joined.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        joined
    }
}

/// Labels of the selected columns as currently offered; unknown columns and
/// empty labels are skipped.
pub fn definition_labels(
    definition: &[ColumnRef],
    options: Option<&[OptionEntry<ColumnRef>]>,
) -> Vec<String> {
    let options = options.unwrap_or_default();
    definition
        .iter()
        .filter_map(|column| {
            options
                .iter()
                .find(|option| &option.value == column)
                .map(|option| option.label.clone())
        })
        .filter(|label| !label.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_falls_back() {
        let labels: [&str; 0] = [];
        assert_eq!(compute_default_label(&labels), FALLBACK_LABEL);
    }

    #[test]
    fn test_in_frame_is_stripped() {
        assert_eq!(compute_default_label(&["CDR3", "VDJRegionInFrame"]), "CDR3-VDJRegion");
    }

    #[test]
    fn test_label_emptied_by_stripping_is_dropped() {
        assert_eq!(compute_default_label(&["  InFrame  "]), FALLBACK_LABEL);
        assert_eq!(compute_default_label(&["InFrame", "CDR3 aa"]), "CDR3 aa");
    }

    #[test]
    fn test_only_first_occurrence_removed() {
        assert_eq!(compute_default_label(&["InFrameInFrame"]), "InFrame");
    }

    #[test]
    fn test_definition_labels_follow_selection_order() {
        let options = vec![
            OptionEntry::new(ColumnRef::from("a"), "CDR3 aa"),
            OptionEntry::new(ColumnRef::from("b"), "VDJRegionInFrame nt"),
            OptionEntry::new(ColumnRef::from("c"), ""),
        ];
        let definition = vec![
            ColumnRef::from("b"),
            ColumnRef::from("missing"),
            ColumnRef::from("c"),
            ColumnRef::from("a"),
        ];
        let labels = definition_labels(&definition, Some(&options));
        assert_eq!(labels, vec!["VDJRegionInFrame nt", "CDR3 aa"]);
        assert_eq!(compute_default_label(&labels), "VDJRegion nt-CDR3 aa");
    }

    #[test]
    fn test_definition_labels_without_options() {
        let definition = vec![ColumnRef::from("a")];
        assert!(definition_labels(&definition, None).is_empty());
    }
}
