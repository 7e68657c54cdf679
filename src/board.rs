use chrono::{DateTime, Duration, Local};

use crate::clock::Clock;
use crate::editor::LineInput;
use crate::models::{EditSession, TaskId, TaskItem};

/// Tasks younger than this and still incomplete are listed as pending.
pub const PENDING_WINDOW_HOURS: i64 = 24;

/// Owns every piece of board state: the task list, the new-task input, the
/// ticked clock value and the (single) edit session.
///
/// Operations on ids that are not in the list are silent no-ops.
pub struct TaskBoard {
    clock: Box<dyn Clock>,
    tasks: Vec<TaskItem>,
    input: LineInput,
    current_time: DateTime<Local>,
    editing: Option<EditSession>,
    last_id: Option<TaskId>,
}

impl TaskBoard {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let current_time = clock.now();
        TaskBoard {
            clock,
            tasks: Vec::new(),
            input: LineInput::default(),
            current_time,
            editing: None,
            last_id: None,
        }
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskItem> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn input(&self) -> &LineInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut LineInput {
        &mut self.input
    }

    pub fn current_time(&self) -> DateTime<Local> {
        self.current_time
    }

    pub fn tick(&mut self, now: DateTime<Local>) {
        self.current_time = now;
    }

    // Creation timestamp in ms, bumped past the last id when two adds share a millisecond
    fn next_id(&mut self, now: DateTime<Local>) -> TaskId {
        let millis = now.timestamp_millis();
        let id = match self.last_id {
            Some(TaskId(last)) if last >= millis => TaskId(last + 1),
            _ => TaskId(millis),
        };
        self.last_id = Some(id);
        id
    }

    /// Appends a task unless `text` is blank, then clears the input field.
    /// Returns the new task's id.
    pub fn add_task(&mut self, text: &str) -> Option<TaskId> {
        if text.trim().is_empty() {
            log::trace!("ignoring blank task text");
            return None;
        }

        let now = self.clock.now();
        let id = self.next_id(now);
        self.tasks.push(TaskItem {
            id,
            text: text.to_string(),
            completed: false,
            added_at: now,
        });
        self.input.clear();
        log::debug!("task {} added", id);
        Some(id)
    }

    /// Adds whatever is currently typed in the input field.
    pub fn submit_input(&mut self) -> Option<TaskId> {
        let text = self.input.as_str().to_string();
        self.add_task(&text)
    }

    pub fn toggle_completion(&mut self, id: TaskId) {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                log::debug!("task {} completed={}", id, task.completed);
            }
            None => log::trace!("toggle on unknown task {}", id),
        }
    }

    pub fn remove_task(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            log::trace!("remove on unknown task {}", id);
            return;
        }
        if self.editing.as_ref().is_some_and(|s| s.id == id) {
            self.editing = None;
        }
        log::debug!("task {} removed", id);
    }

    /// Replaces the task's text and leaves edit mode. Unlike `add_task` the
    /// text is not validated, so an empty string is stored as-is.
    pub fn update_task(&mut self, id: TaskId, new_text: &str) {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.text = new_text.to_string();
                log::debug!("task {} updated", id);
            }
            None => log::trace!("update on unknown task {}", id),
        }
        self.editing = None;
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing.as_ref().is_some_and(|s| s.id == id)
    }

    /// Opens an edit session seeded with the task's text. A session already
    /// open on another task is committed first.
    pub fn begin_edit(&mut self, id: TaskId) {
        if self.is_editing(id) {
            return;
        }
        let Some(text) = self.task(id).map(|t| t.text.clone()) else {
            log::trace!("edit on unknown task {}", id);
            return;
        };
        self.commit_edit();
        self.editing = Some(EditSession {
            id,
            buffer: LineInput::new(text),
        });
    }

    pub fn edit_buffer_mut(&mut self) -> Option<&mut LineInput> {
        self.editing.as_mut().map(|s| &mut s.buffer)
    }

    /// Saves the open edit session, if any. Used for both save and blur.
    pub fn commit_edit(&mut self) {
        if let Some(session) = self.editing.take() {
            self.update_task(session.id, session.buffer.as_str());
        }
    }

    /// Incomplete tasks added less than 24 hours ago, in insertion order.
    pub fn pending_tasks(&self) -> Vec<&TaskItem> {
        let now = self.clock.now();
        let window = Duration::hours(PENDING_WINDOW_HOURS);
        self.tasks
            .iter()
            .filter(|t| !t.completed && now - t.added_at < window)
            .collect()
    }

    /// Elapsed-time label for `task_time` against the ticked clock.
    pub fn time_passed(&self, task_time: DateTime<Local>) -> String {
        elapsed_label(self.current_time - task_time)
    }
}

/// "N hour(s) ago", "N minute(s) ago" or "N second(s) ago", using the largest
/// non-zero unit. Negative spans read as zero seconds.
pub fn elapsed_label(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        return format!("{} {} ago", hours, plural(hours, "hour"));
    }
    if minutes > 0 {
        return format!("{} {} ago", minutes, plural(minutes, "minute"));
    }
    format!("{} {} ago", seconds, plural(seconds, "second"))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::ManualClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn board() -> (TaskBoard, ManualClock) {
        let clock = ManualClock::at(t0());
        (TaskBoard::new(Box::new(clock.clone())), clock)
    }

    fn texts(board: &TaskBoard) -> Vec<&str> {
        board.tasks().iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn add_appends_and_clears_input() {
        let (mut board, _) = board();
        board.input_mut().set("Buy milk");

        let id = board.submit_input().unwrap();

        assert_eq!(board.tasks().len(), 1);
        let task = &board.tasks()[0];
        assert_eq!(task.id, id);
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.added_at, t0());
        assert_eq!(id, TaskId(t0().timestamp_millis()));
        assert!(board.input().is_empty());
    }

    #[test]
    fn blank_text_is_rejected() {
        let (mut board, _) = board();
        board.input_mut().set("   \t ");

        assert_eq!(board.submit_input(), None);
        assert_eq!(board.add_task(""), None);
        assert!(board.tasks().is_empty());
        assert_eq!(board.input().as_str(), "   \t ");
    }

    #[test]
    fn text_is_stored_untrimmed() {
        let (mut board, _) = board();
        board.add_task("  walk dog ");
        assert_eq!(texts(&board), vec!["  walk dog "]);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        let b = board.add_task("b").unwrap();
        let c = board.add_task("c").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        board.remove_task(a);
        let b = board.add_task("b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let (mut board, _) = board();
        let id = board.add_task("Buy milk").unwrap();

        board.toggle_completion(id);
        assert!(board.task(id).unwrap().completed);
        board.toggle_completion(id);
        assert!(!board.task(id).unwrap().completed);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let (mut board, _) = board();
        board.add_task("Buy milk");
        let before = board.tasks().to_vec();

        board.toggle_completion(TaskId(1));
        board.remove_task(TaskId(1));
        board.update_task(TaskId(1), "changed");
        board.begin_edit(TaskId(1));

        assert_eq!(board.tasks(), before.as_slice());
        assert!(board.editing().is_none());
    }

    #[test]
    fn remove_deletes_only_that_task() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        let b = board.add_task("b").unwrap();
        let c = board.add_task("c").unwrap();

        board.remove_task(b);

        let ids: Vec<TaskId> = board.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn update_accepts_empty_text_and_exits_edit_mode() {
        let (mut board, _) = board();
        let id = board.add_task("Buy milk").unwrap();
        board.begin_edit(id);

        board.update_task(id, "");

        assert_eq!(board.task(id).unwrap().text, "");
        assert!(board.editing().is_none());
    }

    #[test]
    fn edit_session_commits_buffer() {
        let (mut board, _) = board();
        let id = board.add_task("Buy milk").unwrap();

        board.begin_edit(id);
        assert_eq!(board.editing().unwrap().buffer.as_str(), "Buy milk");
        let buffer = board.edit_buffer_mut().unwrap();
        for c in " and eggs".chars() {
            buffer.insert_char(c);
        }
        board.commit_edit();

        assert_eq!(board.task(id).unwrap().text, "Buy milk and eggs");
        assert!(!board.is_editing(id));
    }

    #[test]
    fn beginning_another_edit_commits_the_open_one() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        let b = board.add_task("b").unwrap();

        board.begin_edit(a);
        board.edit_buffer_mut().unwrap().set("a2");
        board.begin_edit(b);

        assert_eq!(board.task(a).unwrap().text, "a2");
        assert!(board.is_editing(b));
        assert!(!board.is_editing(a));
    }

    #[test]
    fn begin_edit_on_the_open_task_keeps_the_buffer() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        board.begin_edit(a);
        board.edit_buffer_mut().unwrap().set("draft");
        board.begin_edit(a);
        assert_eq!(board.editing().unwrap().buffer.as_str(), "draft");
        assert_eq!(board.task(a).unwrap().text, "a");
    }

    #[test]
    fn removing_the_edited_task_drops_the_session() {
        let (mut board, _) = board();
        let a = board.add_task("a").unwrap();
        board.begin_edit(a);
        board.remove_task(a);
        assert!(board.editing().is_none());
        board.commit_edit();
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn pending_excludes_completed_and_old_tasks() {
        let (mut board, clock) = board();
        let old = board.add_task("old").unwrap();
        clock.advance(Duration::hours(2));
        let done = board.add_task("done").unwrap();
        let fresh = board.add_task("fresh").unwrap();
        board.toggle_completion(done);

        clock.advance(Duration::hours(22));
        let pending: Vec<TaskId> = board.pending_tasks().iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![fresh]);
        assert!(board.task(old).is_some());
    }

    #[test]
    fn pending_window_is_exclusive_at_24_hours() {
        let (mut board, clock) = board();
        board.add_task("a");

        clock.advance(Duration::hours(24) - Duration::milliseconds(1));
        assert_eq!(board.pending_tasks().len(), 1);
        clock.advance(Duration::milliseconds(1));
        assert!(board.pending_tasks().is_empty());
    }

    #[test]
    fn pending_keeps_insertion_order() {
        let (mut board, clock) = board();
        for text in ["c", "a", "b"] {
            board.add_task(text);
            clock.advance(Duration::seconds(1));
        }
        let pending: Vec<&str> = board.pending_tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(pending, vec!["c", "a", "b"]);
    }

    #[test]
    fn elapsed_labels_pick_the_largest_unit() {
        let cases = [
            (0, "0 seconds ago"),
            (1, "1 second ago"),
            (5, "5 seconds ago"),
            (59, "59 seconds ago"),
            (60, "1 minute ago"),
            (119, "1 minute ago"),
            (120, "2 minutes ago"),
            (3599, "59 minutes ago"),
            (3600, "1 hour ago"),
            (7200, "2 hours ago"),
            (90_000, "25 hours ago"),
        ];
        for (secs, expected) in cases {
            assert_eq!(elapsed_label(Duration::seconds(secs)), expected, "{secs}s");
        }
    }

    #[test]
    fn elapsed_label_floors_partial_seconds() {
        assert_eq!(elapsed_label(Duration::milliseconds(1999)), "1 second ago");
        assert_eq!(elapsed_label(Duration::milliseconds(-500)), "0 seconds ago");
        assert_eq!(elapsed_label(Duration::seconds(-30)), "0 seconds ago");
    }

    #[test]
    fn buy_milk_scenario() {
        let (mut board, clock) = board();
        board.input_mut().set("Buy milk");
        let id = board.submit_input().unwrap();
        assert_eq!(texts(&board), vec!["Buy milk"]);

        clock.advance(Duration::seconds(30));
        board.tick(clock.now());
        assert_eq!(board.time_passed(board.task(id).unwrap().added_at), "30 seconds ago");

        clock.advance(Duration::hours(25));
        board.tick(clock.now());
        assert!(board.pending_tasks().is_empty());
        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.time_passed(t0()), "25 hours ago");
    }
}
