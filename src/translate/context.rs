/// How many captions on each side of the current one are shown to the model
pub const CONTEXT_RADIUS: usize = 4;

/// Build the context block for caption `index` from the original texts.
///
/// Lists up to [`CONTEXT_RADIUS`] previous captions, nearest first, then up to
/// [`CONTEXT_RADIUS`] following captions, one labeled line each. Only original
/// text is read, so the result does not depend on which captions are already
/// translated.
pub fn build_context<S: AsRef<str>>(source_texts: &[S], index: usize) -> String {
    let mut context = String::new();

    for offset in 1..=CONTEXT_RADIUS {
        if let Some(previous) = index.checked_sub(offset).and_then(|i| source_texts.get(i)) {
            context.push_str(&format!("Previous sentence {}: {}\n", offset, previous.as_ref()));
        }
    }

    for offset in 1..=CONTEXT_RADIUS {
        if let Some(next) = source_texts.get(index + offset) {
            context.push_str(&format!("Next sentence {}: {}\n", offset, next.as_ref()));
        }
    }

    context
}
