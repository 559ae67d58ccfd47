use tracing::Span;
use crate::guard::FormKind;

pub fn trace_submission_check(form: FormKind) -> Span {
    tracing::info_span!(
        "submission_check",
        form = %form,
    )
}
