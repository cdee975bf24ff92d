use rand::Rng;
use rand::distributions::{Alphanumeric, DistString};

/// Collision-free output-file name generator, scoped to one run.
///
/// Names have the shape `<seq>_<run-token>_<label>_.png`: a zero-padded
/// monotonic counter, an alphanumeric token drawn once per run, and the
/// configuration label as the third `_`-delimited token, which is where the
/// manifest writer reads it back from.
#[derive(Debug)]
pub struct FileNamer {
    run_token: String,
    counter: u64,
}

impl FileNamer {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self {
            run_token: Alphanumeric.sample_string(rng, 8),
            counter: 0,
        }
    }

    /// Next unique file name carrying the given configuration label.
    pub fn next_name(&mut self, label: &str) -> String {
        let seq = self.counter;
        self.counter += 1;
        format!("{seq:06}_{}_{label}_.png", self.run_token)
    }
}

/// Configuration label of a capture or output file: the third `_`-delimited
/// token of its name.
pub fn configuration_label(file_name: &str) -> Option<&str> {
    file_name.split('_').nth(2)
}
