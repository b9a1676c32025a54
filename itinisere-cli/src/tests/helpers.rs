//! Test helpers shared by the CLI unit and behaviour tests.

use camino::{Utf8Path, Utf8PathBuf};
use itinisere_core::TrafficFeed;
use itinisere_data::feed::test_support::StubTrafficFeed;
use tempfile::TempDir;

use crate::CliError;
use crate::render::{RenderConfig, RenderFeedBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Hands out clones of a canned [`StubTrafficFeed`].
#[derive(Debug, Clone, Default)]
pub(super) struct StubFeedBuilder {
    pub(super) feed: StubTrafficFeed,
}

impl RenderFeedBuilder for StubFeedBuilder {
    fn build(&self, _config: &RenderConfig) -> Result<Box<dyn TrafficFeed>, CliError> {
        Ok(Box::new(self.feed.clone()))
    }
}
