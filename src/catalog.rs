//! Task source: builtin tasks plus the user's custom tasks.

use crate::model::{Task, TaskKind};
use crate::storage::{Config, ConfigStore, CustomTask};
use anyhow::{bail, Result};
use tracing::{info, warn};

/// Builtin tasks: (id, name, command, args).
const BUILTIN: &[(&str, &str, &str, &[&str])] = &[
    ("dnf", "System packages (dnf)", "sudo", &["dnf", "update", "-y"]),
    ("flatpak", "Flatpak applications", "flatpak", &["update", "-y"]),
];

pub fn builtin_tasks() -> Vec<Task> {
    BUILTIN
        .iter()
        .map(|(id, name, command, args)| {
            Task::new(
                *id,
                *name,
                *command,
                args.iter().map(|a| a.to_string()).collect(),
                TaskKind::Builtin,
            )
        })
        .collect()
}

pub struct TaskCatalog {
    store: ConfigStore,
    config: Config,
    include_builtin: bool,
}

#[cfg_attr(not(feature = "tui"), allow(dead_code))]
impl TaskCatalog {
    pub fn load(store: ConfigStore, include_builtin: bool) -> Result<Self> {
        let mut config = store.load()?;
        repair_ids(&mut config.custom_tasks);
        info!(
            path = %store.path().display(),
            custom = config.custom_tasks.len(),
            "task catalog loaded"
        );
        Ok(Self {
            store,
            config,
            include_builtin,
        })
    }

    /// Every task in run order: builtins first, then custom tasks.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks = if self.include_builtin {
            builtin_tasks()
        } else {
            Vec::new()
        };
        tasks.extend(self.config.custom_tasks.iter().map(|ct| {
            Task::new(
                ct.id.clone(),
                ct.name.clone(),
                ct.command.clone(),
                ct.args.clone(),
                TaskKind::Custom,
            )
        }));
        tasks
    }

    pub fn custom_tasks(&self) -> &[CustomTask] {
        &self.config.custom_tasks
    }

    pub fn add_custom(&mut self, name: &str, command: &str, args: Vec<String>) -> Result<String> {
        let id = unique_id(name, self.existing_ids());
        let mut next = self.config.clone();
        next.custom_tasks.push(CustomTask {
            id: id.clone(),
            name: name.to_string(),
            command: command.to_string(),
            args,
        });
        self.commit(next)?;
        Ok(id)
    }

    /// Replace a custom task's fields. The id stays the same across renames.
    pub fn update_custom(
        &mut self,
        id: &str,
        name: &str,
        command: &str,
        args: Vec<String>,
    ) -> Result<()> {
        let mut next = self.config.clone();
        let Some(task) = next.custom_tasks.iter_mut().find(|t| t.id == id) else {
            bail!("no custom task with id {id}");
        };
        task.name = name.to_string();
        task.command = command.to_string();
        task.args = args;
        self.commit(next)
    }

    pub fn remove_custom(&mut self, id: &str) -> Result<()> {
        let mut next = self.config.clone();
        next.custom_tasks.retain(|t| t.id != id);
        if next.custom_tasks.len() == self.config.custom_tasks.len() {
            bail!("no custom task with id {id}");
        }
        self.commit(next)
    }

    /// Save `next`, adopting it only once it is on disk.
    fn commit(&mut self, next: Config) -> Result<()> {
        self.store.save(&next)?;
        self.config = next;
        Ok(())
    }

    fn existing_ids(&self) -> impl Iterator<Item = &str> {
        BUILTIN
            .iter()
            .map(|(id, ..)| *id)
            .chain(self.config.custom_tasks.iter().map(|t| t.id.as_str()))
    }
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "task".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_id<'a>(name: &str, existing: impl Iterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = existing.collect();
    let base = format!("custom-{}", slug(name));
    if !taken.contains(&base.as_str()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Give every entry an id that is non-empty and unique. The first entry
/// holding an id keeps it; empty and repeated ids get fresh ones.
fn repair_ids(tasks: &mut [CustomTask]) {
    let mut taken: Vec<String> = BUILTIN.iter().map(|(id, ..)| id.to_string()).collect();
    let mut needs_id = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        if task.id.is_empty() || taken.contains(&task.id) {
            needs_id.push(i);
        } else {
            taken.push(task.id.clone());
        }
    }
    for i in needs_id {
        let id = unique_id(&tasks[i].name, taken.iter().map(String::as_str));
        if !tasks[i].id.is_empty() {
            warn!(old = %tasks[i].id, new = %id, "duplicate custom task id reassigned");
        }
        tasks[i].id = id.clone();
        taken.push(id);
    }
}
