use crate::clock::SystemClock;
use crate::keep_awake::{AplayLoop, InhibitLock, KeepAwake};
use crate::page::Page;
use crate::storage::FileStore;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type HostPage = Page<FileStore, SystemClock, StdRng>;
pub type HostKeepAwake = KeepAwake<InhibitLock, AplayLoop>;

#[derive(Clone)]
pub struct AppState {
    pub page: Arc<Mutex<HostPage>>,
    pub keep_awake: Option<Arc<Mutex<HostKeepAwake>>>,
}

impl AppState {
    pub fn new(page: Arc<Mutex<HostPage>>, keep_awake: Option<Arc<Mutex<HostKeepAwake>>>) -> Self {
        Self { page, keep_awake }
    }
}
