//! Do some preparations for integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, LazyLock, Once, RwLock};
use std::time::{Duration, Instant};

use papyrd::backends::{Setter, SetterError};
use papyrd::playlist::{self, Playlist};

pub static CAPTURED: LazyLock<Arc<RwLock<String>>> =
    LazyLock::new(|| Arc::new(RwLock::new(String::new())));
static SETUP: Once = Once::new();

struct Capturer {
    content: Arc<RwLock<String>>,
}
impl std::io::Write for Capturer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut locked = self.content.write().unwrap();
        let got = std::str::from_utf8(buf).unwrap();
        locked.push_str(got);
        Ok(got.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn setup() {
    SETUP.call_once(|| {
        let cap = Capturer {
            content: CAPTURED.clone(),
        };
        env_logger::builder()
            .is_test(true)
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .filter_level(log::LevelFilter::Trace)
            .target(env_logger::Target::Pipe(Box::new(cap)))
            .init();
    });
}

pub fn captured() -> String {
    CAPTURED.read().expect("Cannot read captured log").clone()
}

/// Records every wallpaper it is asked to show, optionally failing each time.
#[derive(Clone, Default)]
pub struct Recorder {
    pub shown: Rc<RefCell<Vec<PathBuf>>>,
    pub fail: bool,
}

impl Setter for Recorder {
    async fn apply(&self, path: &Path) -> Result<(), SetterError> {
        self.shown.borrow_mut().push(path.to_path_buf());
        if self.fail {
            Err(SetterError::NotFound)
        } else {
            Ok(())
        }
    }
}

impl Recorder {
    pub fn shown(&self) -> Vec<PathBuf> {
        self.shown.borrow().clone()
    }
}

pub fn wallpaper(index: usize) -> PathBuf {
    PathBuf::from(format!("/wallpapers/{index}.png"))
}

/// A user-ordered playlist of `len` made-up wallpapers.
pub fn ordered(len: usize) -> Playlist {
    let order: Vec<PathBuf> = (0..len).map(wallpaper).collect();
    playlist::build(&[], &HashSet::new(), &order).expect("playlist should not be empty")
}

/// Polls `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}
