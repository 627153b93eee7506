//! Static catalog of ADHD task templates.
//!
//! Each [`TaskKind`] owns an ordered list of [`FieldSpec`]s and a pure prompt
//! renderer. Rendering never fails: a key missing from the value map is
//! substituted with an empty string.

use std::collections::HashMap;
use std::fmt;

/// User-supplied values keyed by [`FieldSpec::key`].
pub type FieldValues = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub multiline: bool,
    /// Preferred number of visible rows. Presentation hint only.
    pub preferred_rows: Option<u16>,
}

const fn line(key: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        multiline: false,
        preferred_rows: None,
    }
}

const fn block(key: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        placeholder,
        multiline: true,
        preferred_rows: Some(4),
    }
}

const DOPAMINE_MENU_FIELDS: &[FieldSpec] = &[block(
    "tasks",
    "Tasks",
    "List tasks you have today...",
)];

const TASK_PARALYSIS_FIELDS: &[FieldSpec] = &[
    line("task", "Task", "What task are you staring at?"),
    line("time", "Time staring", "e.g., 45 minutes"),
];

const HYPERFOCUS_HIJACKER_FIELDS: &[FieldSpec] = &[
    block(
        "wrongThing",
        "Current hyperfocus (wrong thing)",
        "What are you stuck focusing on?",
    ),
    block(
        "importantThing",
        "Important thing",
        "What should you be doing instead?",
    ),
];

const TIME_BLINDNESS_FIELDS: &[FieldSpec] = &[block(
    "taskList",
    "Task list",
    "List tasks you think take 'a few hours'...",
)];

const EXECUTIVE_DYSFUNCTION_FIELDS: &[FieldSpec] = &[block(
    "task",
    "Task",
    "Task you know you should do but can't start",
)];

const MEMORY_PROSTHETIC_FIELDS: &[FieldSpec] = &[block(
    "importantThings",
    "Important things you keep forgetting",
    "Birthdays, bills, medications, etc.",
)];

const RSD_SHIELD_FIELDS: &[FieldSpec] = &[
    line("task", "Task you're avoiding", "e.g., email boss, publish post"),
    block(
        "fears",
        "Fears (rejection, criticism)",
        "What reactions are you scared of?",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskKind {
    #[default]
    DopamineMenu,
    TaskParalysis,
    HyperfocusHijacker,
    TimeBlindness,
    ExecutiveDysfunction,
    MemoryProsthetic,
    RsdShield,
}

impl TaskKind {
    /// Every task, in catalog display order.
    pub const ALL: [TaskKind; 7] = [
        TaskKind::DopamineMenu,
        TaskKind::TaskParalysis,
        TaskKind::HyperfocusHijacker,
        TaskKind::TimeBlindness,
        TaskKind::ExecutiveDysfunction,
        TaskKind::MemoryProsthetic,
        TaskKind::RsdShield,
    ];

    /// Stable identifier stored alongside saved records.
    pub fn id(self) -> &'static str {
        match self {
            TaskKind::DopamineMenu => "dopamineMenu",
            TaskKind::TaskParalysis => "taskParalysis",
            TaskKind::HyperfocusHijacker => "hyperfocusHijacker",
            TaskKind::TimeBlindness => "timeBlindness",
            TaskKind::ExecutiveDysfunction => "executiveDysfunction",
            TaskKind::MemoryProsthetic => "memoryProsthetic",
            TaskKind::RsdShield => "rsdShield",
        }
    }

    pub fn from_id(id: &str) -> Option<TaskKind> {
        Self::ALL.into_iter().find(|task| task.id() == id)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TaskKind::DopamineMenu => "🍭",
            TaskKind::TaskParalysis => "💥",
            TaskKind::HyperfocusHijacker => "🧲",
            TaskKind::TimeBlindness => "⏰",
            TaskKind::ExecutiveDysfunction => "⚙️",
            TaskKind::MemoryProsthetic => "🗂️",
            TaskKind::RsdShield => "🛡️",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TaskKind::DopamineMenu => "Dopamine menu builder",
            TaskKind::TaskParalysis => "Task paralysis breaker",
            TaskKind::HyperfocusHijacker => "Hyperfocus hijacker",
            TaskKind::TimeBlindness => "Time blindness fixer",
            TaskKind::ExecutiveDysfunction => "Executive dysfunction",
            TaskKind::MemoryProsthetic => "Memory prosthetic system",
            TaskKind::RsdShield => "RSD shield builder",
        }
    }

    /// Symbol and title, as shown in the task list.
    pub fn label(self) -> String {
        format!("{} {}", self.symbol(), self.title())
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            TaskKind::DopamineMenu => DOPAMINE_MENU_FIELDS,
            TaskKind::TaskParalysis => TASK_PARALYSIS_FIELDS,
            TaskKind::HyperfocusHijacker => HYPERFOCUS_HIJACKER_FIELDS,
            TaskKind::TimeBlindness => TIME_BLINDNESS_FIELDS,
            TaskKind::ExecutiveDysfunction => EXECUTIVE_DYSFUNCTION_FIELDS,
            TaskKind::MemoryProsthetic => MEMORY_PROSTHETIC_FIELDS,
            TaskKind::RsdShield => RSD_SHIELD_FIELDS,
        }
    }

    pub fn field(self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|field| field.key == key)
    }

    pub fn render_prompt(self, values: &FieldValues) -> String {
        let value = |key: &str| values.get(key).map(String::as_str).unwrap_or("");
        match self {
            TaskKind::DopamineMenu => format!(
                "I have {}. Create a \"dopamine sandwich\" schedule where boring tasks are wrapped in rewarding ones. Include specific rewards and short breaks. Present as a time-blocked list.",
                value("tasks")
            ),
            TaskKind::TaskParalysis => format!(
                "Been staring at {} for {}. Break it into steps so tiny my ADHD brain can't argue. The first step must take under 2 minutes. Include momentum hacks and optional body-doubling ideas.",
                value("task"),
                value("time")
            ),
            TaskKind::HyperfocusHijacker => format!(
                "Currently hyperfocusing on {} but need to do {}. Design a bridge activity that redirects this energy without losing momentum. Give 3 graded bridge options and a 30–60 minute execution plan.",
                value("wrongThing"),
                value("importantThing")
            ),
            TaskKind::TimeBlindness => format!(
                "I think {} will take \"a few hours.\" Calculate realistic time including ADHD tax, transitions, and distractions. Then create a visual schedule with buffers and alarms. Mention break timing and contingency.",
                value("taskList")
            ),
            TaskKind::ExecutiveDysfunction => format!(
                "I know I should {} but physically can't start. Create a \"background process\" method to trick my brain into starting without deciding to. Include micro-steps, environmental tweaks, and a 10-minute warm start.",
                value("task")
            ),
            TaskKind::MemoryProsthetic => format!(
                "I keep forgetting {}. Design an external memory system that doesn't rely on me remembering to check it. Use push-based cues, placement, automation, and redundancy. Include setup checklist and defaults for iPhone/Mac.",
                value("importantThings")
            ),
            TaskKind::RsdShield => format!(
                "I'm avoiding {} because I'm scared of {}. Write a self-talk script and protective protocol that reduces rejection sensitivity while doing it. Include pre-brief, during-task prompts, and aftercare.",
                value("task"),
                value("fears")
            ),
        }
    }

    /// Ordered `(label, value)` pairs for the exported document.
    pub fn export_inputs(self, values: &FieldValues) -> Vec<(String, String)> {
        self.fields()
            .iter()
            .map(|field| {
                let value = values.get(field.key).cloned().unwrap_or_default();
                (field.label.to_string(), value)
            })
            .collect()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

pub fn fields_for(task: TaskKind) -> &'static [FieldSpec] {
    task.fields()
}

pub fn render_prompt(task: TaskKind, values: &FieldValues) -> String {
    task.render_prompt(values)
}
