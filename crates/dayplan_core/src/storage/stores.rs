use crate::model::{ArchiveMap, CompletionMap, NotificationState};
use crate::storage::json_store::{
    ARCHIVE_FILE_NAME, COMPLETIONS_FILE_NAME, NOTIFICATION_STATE_FILE_NAME, Record,
};
use std::path::Path;
use time::Date;
use time::macros::format_description;

pub struct CompletionStore {
    record: Record<CompletionMap>,
}

impl CompletionStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            record: Record::open(dir.join(COMPLETIONS_FILE_NAME)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            record: Record::in_memory(CompletionMap::new()),
        }
    }

    pub fn get(&self, task_id: &str) -> bool {
        self.record.get().get(task_id).copied().unwrap_or(false)
    }

    pub fn set_completion(&mut self, task_id: &str, completed: bool) {
        self.record
            .update(|map| map.insert(task_id.to_string(), completed));
    }

    pub fn toggle(&mut self, task_id: &str) -> bool {
        let completed = !self.get(task_id);
        self.set_completion(task_id, completed);
        completed
    }

    pub fn remove<'a>(&mut self, task_ids: impl IntoIterator<Item = &'a str>) {
        self.record.update(|map| {
            for task_id in task_ids {
                map.remove(task_id);
            }
        });
    }

    pub fn clear_all(&mut self) {
        self.record.update(CompletionMap::clear);
    }

    pub fn snapshot(&self) -> CompletionMap {
        self.record.get().clone()
    }

    pub fn as_map(&self) -> &CompletionMap {
        self.record.get()
    }
}

pub struct ArchiveStore {
    record: Record<ArchiveMap>,
}

impl ArchiveStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            record: Record::open(dir.join(ARCHIVE_FILE_NAME)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            record: Record::in_memory(ArchiveMap::new()),
        }
    }

    pub fn get(&self, date: Date) -> Option<&CompletionMap> {
        self.record.get().get(&archive_key(date))
    }

    /// Writes (or overwrites) the entry for `date`. Returns whether it reached disk.
    pub fn put(&mut self, date: Date, snapshot: CompletionMap) -> bool {
        let key = archive_key(date);
        self.record.update_reporting(|map| {
            map.insert(key, snapshot);
        })
    }

    pub fn entries(&self) -> &ArchiveMap {
        self.record.get()
    }
}

pub struct NotificationStateStore {
    record: Record<NotificationState>,
}

impl NotificationStateStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            record: Record::open(dir.join(NOTIFICATION_STATE_FILE_NAME)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            record: Record::in_memory(NotificationState::default()),
        }
    }

    pub fn state(&self) -> &NotificationState {
        self.record.get()
    }

    pub fn update<R>(&mut self, mutate: impl FnOnce(&mut NotificationState) -> R) -> R {
        self.record.update(mutate)
    }
}

pub fn archive_key(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}
