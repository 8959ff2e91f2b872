/// Something that turns one unit of document text into a model response.
///
/// Failures are folded into the returned string so a run keeps going and the
/// output file still gets a record for the unit.
pub trait InferenceBackend {
    fn generate(&self, text: &str) -> String;
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for &T {
    fn generate(&self, text: &str) -> String {
        (**self).generate(text)
    }
}
