use crate::models::DashboardKind;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 看板结果缓存：进程内常驻，不过期，以 (类型, 期号) 为键
#[derive(Clone, Default)]
pub struct DashboardCache {
    inner: Arc<RwLock<HashMap<(DashboardKind, i32), serde_json::Value>>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: DashboardKind, draw_no: i32) -> Option<serde_json::Value> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&(kind, draw_no)).cloned()
    }

    pub fn set(&self, kind: DashboardKind, draw_no: i32, value: serde_json::Value) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.insert((kind, draw_no), value);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
