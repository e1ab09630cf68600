//! Qualifier / scope classification and annotation presence checks

use crate::annotation::{Annotation, AnnotationType, Designator};
use crate::error::{InjectError, InjectResult};

/// Find the single qualifier annotation in `annotations`.
///
/// Returns `Ok(None)` when no annotation type is designated as a qualifier,
/// and [`InjectError::AmbiguousMetadata`] when more than one is.
pub fn find_qualifier(annotations: &[Annotation]) -> InjectResult<Option<&Annotation>> {
    find_designated(annotations, Designator::Qualifier)
}

/// Find the single scope annotation in `annotations`.
///
/// Same rules as [`find_qualifier`], using the scope designator.
pub fn find_scope(annotations: &[Annotation]) -> InjectResult<Option<&Annotation>> {
    find_designated(annotations, Designator::Scope)
}

fn find_designated(
    annotations: &[Annotation],
    designator: Designator,
) -> InjectResult<Option<&Annotation>> {
    let mut found: Option<&Annotation> = None;
    for annotation in annotations {
        if !annotation.annotation_type().is_designated(designator) {
            continue;
        }
        if let Some(existing) = found {
            return Err(InjectError::AmbiguousMetadata {
                designator,
                existing: existing.annotation_type().name().to_string(),
                found: annotation.annotation_type().name().to_string(),
            });
        }
        found = Some(annotation);
    }
    Ok(found)
}

/// Check if an annotation of exactly `annotation_type` is present.
///
/// Only type identity counts; designators are not consulted.
pub fn has_annotation(annotations: &[Annotation], annotation_type: &AnnotationType) -> bool {
    annotations
        .iter()
        .any(|annotation| annotation.annotation_type() == annotation_type)
}
