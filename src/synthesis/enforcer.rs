//! 不变量强制：管线最后一步的纯函数后处理，幂等
//!
//! - 标题 / 副标题 / id 全表唯一，选项标题与 id 步内唯一（重复者追加递增数字后缀）
//! - tiles / multiSelect 选项数为 4 或 6；dropdown 为 3..=6
//! - documentInfo 紧跟在唯一的 documentUpload 之后
//! - location、contact 依次位于末尾
//! - 选项图标在词表内、Emoji 非空

use std::collections::HashSet;

use crate::form::{
    is_valid_emoji, is_valid_icon, Choice, DefaultIconMapper, DocumentInfoStep,
    FormSpecification, Step, StepKind, StepType, DEFAULT_EMOJI, DEFAULT_ICON,
};

const DEFAULT_STEP_TITLE: &str = "Question";
const DEFAULT_STEP_SUBTITLE: &str = "Please answer the question below";
const DEFAULT_OPTION_TITLE: &str = "Option";

const DROPDOWN_MIN: usize = 3;
const DROPDOWN_MAX: usize = 6;

/// 执行全部修正，返回满足不变量的表单
pub fn enforce(spec: FormSpecification) -> FormSpecification {
    let mut spec = spec;
    let mapper = DefaultIconMapper::new();

    for (i, step) in spec.steps.iter_mut().enumerate() {
        fill_step_text(step, i);
        fix_option_count(step);
        if let Some(options) = step.kind.options_mut() {
            fix_choices(options, &mapper);
        }
        if let StepKind::Slider(slider) = &mut step.kind {
            sanitize_slider(slider);
        }
    }

    place_document_info(&mut spec.steps);
    reorder_terminal_steps(&mut spec.steps);

    dedupe(spec.steps.iter_mut().map(|s| &mut s.title), " ");
    dedupe(spec.steps.iter_mut().map(|s| &mut s.subtitle), " ");
    dedupe(spec.steps.iter_mut().map(|s| &mut s.id), "-");

    spec
}

/// 给重复值追加递增后缀：第二个 "Question" 变为 "Question 1"，第三个变为 "Question 2"
pub fn dedupe<'a>(values: impl IntoIterator<Item = &'a mut String>, separator: &str) {
    let mut seen: HashSet<String> = HashSet::new();
    for value in values {
        if seen.insert(value.clone()) {
            continue;
        }
        let base = value.clone();
        let mut n = 1;
        let candidate = loop {
            let candidate = format!("{base}{separator}{n}");
            if !seen.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        seen.insert(candidate.clone());
        *value = candidate;
    }
}

fn fill_step_text(step: &mut Step, index: usize) {
    if step.title.trim().is_empty() {
        step.title = DEFAULT_STEP_TITLE.to_string();
    }
    if step.subtitle.trim().is_empty() {
        step.subtitle = DEFAULT_STEP_SUBTITLE.to_string();
    }
    if step.id.trim().is_empty() {
        step.id = format!("step-{}", index + 1);
    }
}

fn placeholder_options(count: usize) -> Vec<Choice> {
    (1..=count)
        .map(|i| {
            Choice::new(format!("option-{i}"), format!("{DEFAULT_OPTION_TITLE} {i}"))
                .with_icon(DEFAULT_ICON, DEFAULT_EMOJI)
        })
        .collect()
}

/// 复制首个选项（id 追加后缀）直到 `target` 个
fn pad_with_first(options: &mut Vec<Choice>, target: usize) {
    let Some(first) = options.first().cloned() else {
        *options = placeholder_options(target);
        return;
    };
    let mut n = 1;
    while options.len() < target {
        let mut copy = first.clone();
        copy.id = format!("{}-{}", first.id, n);
        options.push(copy);
        n += 1;
    }
}

fn fix_option_count(step: &mut Step) {
    let tile_like = step.step_type().is_tile_like();
    let Some(options) = step.kind.options_mut() else {
        return;
    };

    if tile_like {
        match options.len() {
            4 | 6 => {}
            // 5 个时去掉最后一个，而不是补到 6 个
            5 => options.truncate(4),
            n if n > 6 => options.truncate(6),
            _ => pad_with_first(options, 4),
        }
    } else if options.len() > DROPDOWN_MAX {
        options.truncate(DROPDOWN_MAX);
    } else if options.len() < DROPDOWN_MIN {
        pad_with_first(options, DROPDOWN_MIN);
    }
}

fn fix_choices(options: &mut [Choice], mapper: &DefaultIconMapper) {
    for (i, choice) in options.iter_mut().enumerate() {
        if choice.title.trim().is_empty() {
            choice.title = DEFAULT_OPTION_TITLE.to_string();
        }
        if choice.id.trim().is_empty() {
            choice.id = format!("option-{}", i + 1);
        }
        if !is_valid_icon(&choice.icon) {
            choice.icon = mapper.validate_or_map(&choice.icon, &choice.title);
        }
        if !is_valid_emoji(&choice.emoji) {
            choice.emoji = DEFAULT_EMOJI.to_string();
        }
    }
    dedupe(options.iter_mut().map(|o| &mut o.title), " ");
    dedupe(options.iter_mut().map(|o| &mut o.id), "-");
}

fn sanitize_slider(slider: &mut crate::form::SliderStep) {
    if !(slider.step > 0.0) {
        slider.step = 1.0;
    }
    if slider.min > slider.max {
        std::mem::swap(&mut slider.min, &mut slider.max);
    }
    if slider.min == slider.max {
        slider.max = slider.min + 100.0 * slider.step;
    }
    slider.default_value = slider.default_value.clamp(slider.min, slider.max);
}

fn default_document_info() -> Step {
    Step::new(
        "document-info",
        "About your document",
        "Here is what happens with the file you shared",
        StepKind::DocumentInfo(DocumentInfoStep::default()),
    )
}

/// 只保留第一个 documentUpload，并把恰好一个 documentInfo 放到它后面；没有上传步骤时丢弃 documentInfo
pub fn place_document_info(steps: &mut Vec<Step>) {
    let (infos, mut rest): (Vec<Step>, Vec<Step>) = std::mem::take(steps)
        .into_iter()
        .partition(|s| s.step_type() == StepType::DocumentInfo);

    let mut seen_upload = false;
    rest.retain(|s| {
        if s.step_type() != StepType::DocumentUpload {
            return true;
        }
        let keep = !seen_upload;
        seen_upload = true;
        keep
    });

    match rest
        .iter()
        .position(|s| s.step_type() == StepType::DocumentUpload)
    {
        Some(upload) => {
            let info = infos.into_iter().next().unwrap_or_else(default_document_info);
            rest.insert(upload + 1, info);
        }
        None if !infos.is_empty() => {
            tracing::warn!("Dropping {} documentInfo step(s) without an upload", infos.len());
        }
        None => {}
    }
    *steps = rest;
}

/// 把 location、contact 移到末尾（各保留第一个），顺序固定为 location → contact，其余步骤相对顺序不变
pub fn reorder_terminal_steps(steps: &mut Vec<Step>) {
    let mut location = None;
    let mut contact = None;
    let mut rest = Vec::with_capacity(steps.len());

    for step in std::mem::take(steps) {
        match step.step_type() {
            StepType::Location => {
                location.get_or_insert(step);
            }
            StepType::Contact => {
                contact.get_or_insert(step);
            }
            _ => rest.push(step),
        }
    }
    rest.extend(location);
    rest.extend(contact);
    *steps = rest;
}

/// 列出违反的不变量（空表示全部满足）
pub fn check_invariants(spec: &FormSpecification) -> Vec<String> {
    let mut violations = Vec::new();

    let mut titles = HashSet::new();
    let mut subtitles = HashSet::new();
    for step in &spec.steps {
        if step.title.trim().is_empty() {
            violations.push(format!("step {} has an empty title", step.id));
        }
        if !titles.insert(step.title.as_str()) {
            violations.push(format!("duplicate title {:?}", step.title));
        }
        if !subtitles.insert(step.subtitle.as_str()) {
            violations.push(format!("duplicate subtitle {:?}", step.subtitle));
        }

        let options = step.kind.options();
        let mut option_titles = HashSet::new();
        for option in options {
            if !option_titles.insert(option.title.as_str()) {
                violations.push(format!("duplicate option {:?} in {}", option.title, step.id));
            }
            if !is_valid_icon(&option.icon) {
                violations.push(format!("icon {:?} not in vocabulary", option.icon));
            }
            if option.emoji.trim().is_empty() {
                violations.push(format!("option {:?} has no emoji", option.title));
            }
        }
        if step.step_type().is_tile_like() && !matches!(options.len(), 4 | 6) {
            violations.push(format!("{} has {} options", step.id, options.len()));
        }
    }

    let types: Vec<StepType> = spec.steps.iter().map(Step::step_type).collect();
    if let Some(upload) = types.iter().position(|t| *t == StepType::DocumentUpload) {
        let infos = types.iter().filter(|t| **t == StepType::DocumentInfo).count();
        if infos != 1 || types.get(upload + 1) != Some(&StepType::DocumentInfo) {
            violations.push("documentInfo must directly follow documentUpload".to_string());
        }
    }

    let terminal: Vec<StepType> = types
        .iter()
        .copied()
        .filter(|t| matches!(t, StepType::Location | StepType::Contact))
        .collect();
    let tail = &types[types.len() - terminal.len()..];
    let ordered = matches!(
        terminal.as_slice(),
        [] | [StepType::Location] | [StepType::Contact] | [StepType::Location, StepType::Contact]
    );
    if tail != terminal.as_slice() || !ordered {
        violations.push("location/contact must be the final steps in that order".to_string());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{
        ChoiceStep, ContactStep, DocumentUploadStep, LocationStep, SliderStep, TextboxStep,
    };

    fn tiles(id: &str, title: &str, n: usize) -> Step {
        let options = (0..n)
            .map(|i| Choice::new(format!("o{i}"), format!("Choice {i}")))
            .collect();
        Step::new(id, title, format!("{title} sub"), StepKind::Tiles(ChoiceStep { options }))
    }

    fn textbox(id: &str, title: &str) -> Step {
        Step::new(id, title, format!("{title} sub"), StepKind::Textbox(TextboxStep::default()))
    }

    fn spec(steps: Vec<Step>) -> FormSpecification {
        FormSpecification {
            steps,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_options_padded_to_four() {
        let out = enforce(spec(vec![tiles("t", "T", 3)]));
        let options = out.steps[0].kind.options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[3].id, "o0-1");
        assert_eq!(options[3].title, "Choice 0 1");
        assert!(check_invariants(&out).is_empty());
    }

    #[test]
    fn test_five_options_truncated_to_four() {
        let out = enforce(spec(vec![tiles("t", "T", 5)]));
        let options = out.steps[0].kind.options();
        assert_eq!(options.len(), 4);
        assert_eq!(options[3].title, "Choice 3");
    }

    #[test]
    fn test_seven_options_truncated_to_six() {
        let out = enforce(spec(vec![tiles("t", "T", 7)]));
        assert_eq!(out.steps[0].kind.options().len(), 6);
    }

    #[test]
    fn test_multiselect_count_and_empty_tiles() {
        let mut multi = tiles("m", "M", 2);
        multi.kind = StepKind::MultiSelect(ChoiceStep {
            options: multi.kind.options().to_vec(),
        });
        let out = enforce(spec(vec![multi, tiles("e", "E", 0)]));
        assert_eq!(out.steps[0].kind.options().len(), 4);
        let empty = out.steps[1].kind.options();
        assert_eq!(empty.len(), 4);
        assert_eq!(empty[0].title, "Option 1");
        assert!(check_invariants(&out).is_empty());
    }

    #[test]
    fn test_duplicate_titles_get_suffix() {
        let out = enforce(spec(vec![
            textbox("a", "Question"),
            textbox("b", "Question"),
            textbox("c", "Question"),
        ]));
        let titles: Vec<_> = out.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Question", "Question 1", "Question 2"]);
        let subs: Vec<_> = out.steps.iter().map(|s| s.subtitle.as_str()).collect();
        assert_eq!(subs, vec!["Question sub", "Question sub 1", "Question sub 2"]);
    }

    #[test]
    fn test_duplicate_option_titles_within_step() {
        let mut step = tiles("t", "T", 4);
        if let Some(opts) = step.kind.options_mut() {
            opts[2].title = "Choice 0".to_string();
        }
        let out = enforce(spec(vec![step]));
        let titles: Vec<_> = out.steps[0]
            .kind
            .options()
            .iter()
            .map(|o| o.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Choice 0", "Choice 1", "Choice 0 1", "Choice 3"]);
    }

    #[test]
    fn test_terminal_reorder() {
        let location = Step::new("loc", "Where", "w", StepKind::Location(LocationStep::default()));
        let contact = Step::new("con", "Who", "c", StepKind::Contact(ContactStep::default()));
        let steps = vec![
            textbox("a", "A"),
            contact,
            textbox("b", "B"),
            textbox("c", "C"),
            location,
            textbox("d", "D"),
        ];
        let out = enforce(spec(steps));
        let ids: Vec<_> = out.steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "loc", "con"]);
    }

    #[test]
    fn test_document_info_follows_upload() {
        let upload = Step::new(
            "up",
            "Upload",
            "u",
            StepKind::DocumentUpload(DocumentUploadStep::default()),
        );
        let out = enforce(spec(vec![upload, textbox("a", "A")]));
        let types: Vec<_> = out.steps.iter().map(Step::step_type).collect();
        assert_eq!(
            types,
            vec![StepType::DocumentUpload, StepType::DocumentInfo, StepType::Textbox]
        );
        assert!(check_invariants(&out).is_empty());
    }

    #[test]
    fn test_orphan_document_info_dropped() {
        let info = default_document_info();
        let out = enforce(spec(vec![info, textbox("a", "A")]));
        assert_eq!(out.steps.len(), 1);
    }

    #[test]
    fn test_slider_sanitized() {
        let slider = Step::new(
            "s",
            "S",
            "s",
            StepKind::Slider(SliderStep {
                min: 500.0,
                max: 100.0,
                step: 0.0,
                default_value: 900.0,
                ..SliderStep::default()
            }),
        );
        let out = enforce(spec(vec![slider]));
        match &out.steps[0].kind {
            StepKind::Slider(s) => {
                assert_eq!((s.min, s.max, s.step, s.default_value), (100.0, 500.0, 1.0, 500.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_icons_and_missing_emoji_fixed() {
        let mut step = tiles("t", "T", 4);
        if let Some(opts) = step.kind.options_mut() {
            opts[0].title = "Home".to_string();
            opts[0].icon = "rocket".to_string();
        }
        let out = enforce(spec(vec![step]));
        let options = out.steps[0].kind.options();
        assert_eq!(options[0].icon, "home");
        assert!(options.iter().all(|o| o.emoji == DEFAULT_EMOJI));
    }

    #[test]
    fn test_enforce_is_idempotent() {
        let steps = vec![tiles("t", "T", 3), textbox("t", "T"), tiles("x", "", 9)];
        let once = enforce(spec(steps));
        let twice = enforce(once.clone());
        assert_eq!(once, twice);
        assert!(check_invariants(&once).is_empty());
    }
}
