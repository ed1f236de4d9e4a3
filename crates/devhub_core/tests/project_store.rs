use devhub_core::tree::mutate::{collect_ids, find_task};
use devhub_core::{
    JsonFileSnapshotRepository, Project, ProjectCollection, ProjectPatch, ProjectStore, RepoError,
    RepoResult, SnapshotRepository, SqliteSnapshotRepository, StoreError, Task, TaskAction,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use uuid::Uuid;

/// In-memory adapter that records saves and can be told to fail.
#[derive(Default)]
struct RecordingRepository {
    stored: RefCell<ProjectCollection>,
    saves: Cell<usize>,
    fail_saves: Cell<bool>,
}

impl RecordingRepository {
    fn with(collection: ProjectCollection) -> Self {
        Self {
            stored: RefCell::new(collection),
            ..Self::default()
        }
    }
}

impl SnapshotRepository for RecordingRepository {
    fn load_snapshot(&self) -> RepoResult<ProjectCollection> {
        Ok(self.stored.borrow().clone())
    }

    fn save_snapshot(&self, snapshot: &ProjectCollection) -> RepoResult<()> {
        if self.fail_saves.get() {
            return Err(RepoError::InvalidData("disk unplugged".to_string()));
        }
        self.saves.set(self.saves.get() + 1);
        *self.stored.borrow_mut() = snapshot.clone();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

fn empty_store() -> ProjectStore<RecordingRepository> {
    ProjectStore::open(RecordingRepository::default()).unwrap()
}

fn store_with_project(name: &str) -> (ProjectStore<RecordingRepository>, Uuid) {
    let mut store = empty_store();
    let id = store.create_project(name).unwrap().unwrap();
    (store, id)
}

fn add_root(store: &mut ProjectStore<RecordingRepository>, project: Uuid, text: &str) -> Uuid {
    store
        .task_action(
            project,
            TaskAction::AddRoot {
                text: text.to_string(),
            },
        )
        .unwrap()
        .unwrap()
}

fn tasks(store: &ProjectStore<RecordingRepository>, project: Uuid) -> &[Task] {
    &store.project(project).unwrap().tasks
}

#[test]
fn create_project_persists_empty_non_default_project() {
    let (store, id) = store_with_project("Dev Hub");

    let project = store.project(id).unwrap();
    assert_eq!(project.name, "Dev Hub");
    assert!(project.tasks.is_empty());
    assert!(!project.is_default);
    assert!(!project.is_deleted);
    assert_eq!(store.repository().saves.get(), 1);
    assert!(store.repository().stored.borrow().contains(id));
}

#[test]
fn create_project_ignores_blank_name() {
    let mut store = empty_store();
    assert_eq!(store.create_project("   ").unwrap(), None);
    assert!(store.projects().is_empty());
    assert_eq!(store.repository().saves.get(), 0);
}

#[test]
fn update_project_merges_fields_and_ignores_unknown_id() {
    let (mut store, id) = store_with_project("before");

    assert!(store
        .update_project(id, ProjectPatch::description("docs"))
        .unwrap());
    assert!(store.update_project(id, ProjectPatch::name("after")).unwrap());
    let project = store.project(id).unwrap();
    assert_eq!(project.name, "after");
    assert_eq!(project.description, "docs");

    let saves = store.repository().saves.get();
    assert!(!store
        .update_project(Uuid::new_v4(), ProjectPatch::name("ghost"))
        .unwrap());
    assert_eq!(store.repository().saves.get(), saves);
}

#[test]
fn update_project_normalizes_supplied_task_tree() {
    let (mut store, id) = store_with_project("tree");
    let mut parent = Task::new("parent");
    parent.is_completed = true;
    parent.subtasks = vec![Task::new("open")];

    store
        .update_project(id, ProjectPatch::tasks(vec![parent]))
        .unwrap();
    assert!(!tasks(&store, id)[0].is_completed);
}

#[test]
fn update_project_reissues_repeated_task_ids() {
    let (mut store, id) = store_with_project("dupes");
    let shared = Task::new("shared");
    let mut parent = Task::new("parent");
    parent.subtasks = vec![shared.clone()];

    store
        .update_project(id, ProjectPatch::tasks(vec![shared.clone(), parent]))
        .unwrap();
    let ids = collect_ids(tasks(&store, id));
    let unique: HashSet<Uuid> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(unique.len(), 3);
    assert_eq!(ids[0], shared.id);

    store
        .task_action(id, TaskAction::Delete { id: shared.id })
        .unwrap();
    let remaining = tasks(&store, id);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].text, "parent");
    assert_eq!(remaining[0].subtasks.len(), 1);
    assert_eq!(remaining[0].subtasks[0].text, "shared");
}

#[test]
fn update_project_with_empty_patch_skips_save() {
    let (mut store, id) = store_with_project("idle");
    let saves = store.repository().saves.get();

    assert!(store.update_project(id, ProjectPatch::default()).unwrap());
    assert_eq!(store.repository().saves.get(), saves);
    assert!(!store
        .update_project(Uuid::new_v4(), ProjectPatch::default())
        .unwrap());
}

#[test]
fn set_default_leaves_exactly_one_default() {
    let mut store = empty_store();
    let p1 = store.create_project("p1").unwrap().unwrap();
    let p2 = store.create_project("p2").unwrap().unwrap();
    store.set_default(p1).unwrap();

    assert!(store.set_default(p2).unwrap());
    assert!(!store.project(p1).unwrap().is_default);
    assert!(store.project(p2).unwrap().is_default);
    assert_eq!(store.projects().iter().filter(|p| p.is_default).count(), 1);

    assert!(!store.set_default(Uuid::new_v4()).unwrap());
    assert!(store.project(p2).unwrap().is_default);
}

#[test]
fn soft_delete_restore_and_permanent_delete() {
    let mut store = empty_store();
    let keep = store.create_project("keep").unwrap().unwrap();
    let trash = store.create_project("trash").unwrap().unwrap();

    assert!(store.soft_delete(trash).unwrap());
    assert_eq!(store.active_projects().count(), 1);
    assert_eq!(store.trashed_projects().next().unwrap().id, trash);

    assert!(store.restore(trash).unwrap());
    assert_eq!(store.trashed_projects().count(), 0);

    store.soft_delete(trash).unwrap();
    assert!(store.permanent_delete(trash).unwrap());
    assert!(store.project(trash).is_none());
    assert!(!store.restore(trash).unwrap());
    assert!(!store.permanent_delete(trash).unwrap());
    assert_eq!(store.projects().len(), 1);
    assert_eq!(store.projects()[0].id, keep);
    assert!(!store.repository().stored.borrow().contains(trash));
}

#[test]
fn default_selection_prefers_active_default_then_first_active() {
    let mut store = empty_store();
    assert_eq!(store.default_selection(), None);

    let first = store.create_project("first").unwrap().unwrap();
    let second = store.create_project("second").unwrap().unwrap();
    assert_eq!(store.default_selection(), Some(first));

    store.set_default(second).unwrap();
    assert_eq!(store.default_selection(), Some(second));

    store.soft_delete(second).unwrap();
    assert_eq!(store.default_selection(), Some(first));

    store.soft_delete(first).unwrap();
    assert_eq!(store.default_selection(), None);
}

#[test]
fn toggle_last_open_child_completes_parent() {
    let (mut store, project) = store_with_project("scenario");
    let a = add_root(&mut store, project, "A");
    let b = store
        .task_action(project, TaskAction::AddSubtask { parent_id: a })
        .unwrap()
        .unwrap();
    let c = store
        .task_action(project, TaskAction::AddSubtask { parent_id: a })
        .unwrap()
        .unwrap();
    store
        .task_action(project, TaskAction::Toggle { id: b })
        .unwrap();
    assert!(!tasks(&store, project)[0].is_completed);

    store
        .task_action(project, TaskAction::Toggle { id: c })
        .unwrap();
    let tree = tasks(&store, project);
    assert!(tree[0].is_completed);
    assert!(find_task(tree, b).unwrap().is_completed);
    assert!(find_task(tree, c).unwrap().is_completed);
    assert_eq!(store.repository().stored.borrow().get(project).unwrap().tasks, tree);
}

#[test]
fn adding_open_subtask_reopens_completed_parent() {
    let (mut store, project) = store_with_project("scenario");
    let a = add_root(&mut store, project, "A");
    let b = store
        .task_action(project, TaskAction::AddSubtask { parent_id: a })
        .unwrap()
        .unwrap();
    store
        .task_action(project, TaskAction::Toggle { id: b })
        .unwrap();
    assert!(tasks(&store, project)[0].is_completed);

    let d = store
        .task_action(project, TaskAction::AddSubtask { parent_id: a })
        .unwrap()
        .unwrap();
    let tree = tasks(&store, project);
    assert!(!find_task(tree, d).unwrap().is_completed);
    assert!(!tree[0].is_completed);
}

#[test]
fn add_sibling_lands_right_after_reference() {
    let (mut store, project) = store_with_project("siblings");
    add_root(&mut store, project, "A");
    let b = add_root(&mut store, project, "B");
    add_root(&mut store, project, "C");

    let created = store
        .task_action(project, TaskAction::AddSibling { ref_id: b })
        .unwrap()
        .unwrap();
    let tree = tasks(&store, project);
    let texts: Vec<&str> = tree.iter().map(|task| task.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B", "", "C"]);
    assert_eq!(tree[2].id, created);
}

#[test]
fn edit_expand_and_delete_actions() {
    let (mut store, project) = store_with_project("edits");
    let a = add_root(&mut store, project, "A");
    let child = store
        .task_action(project, TaskAction::AddSubtask { parent_id: a })
        .unwrap()
        .unwrap();

    store
        .task_action(
            project,
            TaskAction::EditText {
                id: child,
                text: "renamed".to_string(),
            },
        )
        .unwrap();
    store
        .task_action(project, TaskAction::ToggleExpand { id: a })
        .unwrap();
    let tree = tasks(&store, project);
    assert_eq!(find_task(tree, child).unwrap().text, "renamed");
    assert!(!tree[0].is_expanded);

    store
        .task_action(project, TaskAction::Delete { id: a })
        .unwrap();
    assert!(tasks(&store, project).is_empty());
}

#[test]
fn task_action_on_unknown_project_is_noop() {
    let (mut store, _project) = store_with_project("only");
    let saves = store.repository().saves.get();

    let created = store
        .task_action(
            Uuid::new_v4(),
            TaskAction::AddRoot {
                text: "lost".to_string(),
            },
        )
        .unwrap();
    assert!(created.is_none());
    assert_eq!(store.repository().saves.get(), saves);
}

#[test]
fn save_failure_keeps_in_memory_state_and_reload_reconciles() {
    let (mut store, project) = store_with_project("optimistic");
    store.repository().fail_saves.set(true);

    let err = store
        .task_action(
            project,
            TaskAction::AddRoot {
                text: "unsaved".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
    assert_eq!(tasks(&store, project).len(), 1);

    let report = store.reload().unwrap();
    assert!(report.is_clean());
    assert!(tasks(&store, project).is_empty());
}

#[test]
fn open_repairs_inconsistent_snapshot() {
    let mut first = Project::new("first");
    first.is_default = true;
    let mut stale = Task::new("stale parent");
    stale.is_completed = true;
    stale.subtasks = vec![Task::new("open")];
    first.tasks = vec![stale];
    let mut second = Project::new("second");
    second.is_default = true;

    let repo = RecordingRepository::with(ProjectCollection::from_projects(vec![
        first.clone(),
        second.clone(),
    ]));
    let store = ProjectStore::open(repo).unwrap();

    assert!(store.project(first.id).unwrap().is_default);
    assert!(!store.project(second.id).unwrap().is_default);
    assert!(!tasks(&store, first.id)[0].is_completed);
    assert_eq!(store.repository().saves.get(), 0);
}

#[test]
fn json_backed_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("projects.json");

    let (project, task) = {
        let mut store = ProjectStore::open(JsonFileSnapshotRepository::new(&path)).unwrap();
        let project = store.create_project("persisted").unwrap().unwrap();
        let task = store
            .task_action(
                project,
                TaskAction::AddRoot {
                    text: "remember me".to_string(),
                },
            )
            .unwrap()
            .unwrap();
        store.set_default(project).unwrap();
        (project, task)
    };

    let store = ProjectStore::open(JsonFileSnapshotRepository::new(&path)).unwrap();
    let loaded = store.project(project).unwrap();
    assert!(loaded.is_default);
    assert_eq!(find_task(&loaded.tasks, task).unwrap().text, "remember me");
}

#[test]
fn sqlite_backed_store_persists_every_mutation() {
    let repo = SqliteSnapshotRepository::open_in_memory().unwrap();
    let mut store = ProjectStore::open(repo).unwrap();
    let project = store.create_project("sql").unwrap().unwrap();
    store
        .task_action(
            project,
            TaskAction::AddRoot {
                text: "row".to_string(),
            },
        )
        .unwrap();
    store.soft_delete(project).unwrap();

    let reloaded = store.repository().load_snapshot().unwrap();
    let stored = reloaded.get(project).unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.tasks.len(), 1);
}
