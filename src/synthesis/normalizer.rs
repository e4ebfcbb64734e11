//! 结构规整：把上游模型五花八门的字段名 / 形状迁移成规范的步骤结构
//!
//! 在 serde_json::Value 上逐步做形状迁移，然后逐个步骤转换为强类型 Step；转换失败的步骤被丢弃并计数。
//! 所有迁移都是幂等的：对已经规范的输入不做任何改变。

use serde_json::{Map, Value};

use crate::form::{
    ContactFields, FormSpecification, LocationLabels, Step, StepType, Submission, Theme, UiText,
};

/// 规整 + 强类型转换的结果
#[derive(Debug, Clone)]
pub struct NormalizedForm {
    pub spec: FormSpecification,
    /// 无法转换而被丢弃的步骤数
    pub dropped_steps: usize,
}

/// 根对象是否带非空 steps 数组（结构有效性检查）
pub fn has_steps(root: &Value) -> bool {
    root.get("steps")
        .and_then(Value::as_array)
        .is_some_and(|steps| !steps.is_empty())
}

/// 规整整份表单（原地）
pub fn normalize_form(root: &mut Value) {
    let Some(steps) = root.get_mut("steps").and_then(Value::as_array_mut) else {
        return;
    };
    for step in steps.iter_mut() {
        normalize_step(step);
    }
}

/// 规整后转换为强类型；ui / submission / theme 单独转换，形状不对时用默认值
pub fn into_specification(mut root: Value) -> NormalizedForm {
    normalize_form(&mut root);

    let mut dropped_steps = 0;
    let mut steps = Vec::new();
    let raw_steps = root
        .get_mut("steps")
        .map(Value::take)
        .and_then(|v| match v {
            Value::Array(items) => Some(items),
            _ => None,
        })
        .unwrap_or_default();

    for raw in raw_steps {
        match serde_json::from_value::<Step>(raw) {
            Ok(step) => steps.push(step),
            Err(e) => {
                dropped_steps += 1;
                tracing::warn!("Dropping step that does not fit the schema: {}", e);
            }
        }
    }

    let section = |key: &str| root.get(key).cloned().unwrap_or(Value::Null);
    let spec = FormSpecification {
        steps,
        ui: serde_json::from_value::<UiText>(section("ui")).unwrap_or_default(),
        submission: serde_json::from_value::<Submission>(section("submission"))
            .unwrap_or_default(),
        theme: serde_json::from_value::<Theme>(section("theme")).unwrap_or_default(),
    };

    NormalizedForm {
        spec,
        dropped_steps,
    }
}

/// 规整单个步骤（原地）
pub fn normalize_step(step: &mut Value) {
    strip_nulls(step);
    let Some(map) = step.as_object_mut() else {
        return;
    };

    rename_if_absent(map, "label", "title");
    rename_if_absent(map, "question", "title");

    if !map.contains_key("subtitle") {
        if let Some(field) = map.get("field").and_then(Value::as_str) {
            let subtitle = format!("Please select your {field}");
            map.insert("subtitle".into(), Value::String(subtitle));
        }
    }
    rename_if_absent(map, "description", "subtitle");
    coerce_text(map, "title");
    coerce_text(map, "subtitle");

    ensure_id(map, "step");

    let step_type = resolve_type(map);
    if let Some(t) = step_type {
        map.insert("type".into(), Value::String(t.as_str().to_string()));
    }

    match step_type {
        Some(StepType::Tiles | StepType::MultiSelect | StepType::Dropdown) => {
            normalize_options(map)
        }
        Some(StepType::Location) => normalize_location(map),
        Some(StepType::Slider) => normalize_slider(map),
        Some(StepType::Contact) => normalize_contact(map),
        Some(StepType::Textbox) => migrate_required(map),
        Some(StepType::DocumentUpload) => normalize_document_upload(map),
        _ => {}
    }
    coerce_payload_scalars(map);
}

/// 递归删除对象中的 null 键与数组中的 null 元素，让 `#[serde(default)]` 的默认值生效
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

/// 计数 / 字节数字段（u32 / u64）
const COUNT_KEYS: [&str; 3] = ["rows", "minLength", "maxFileSize"];
/// 步骤顶层与 config 中的文本字段
const TEXT_KEYS: [&str; 5] = ["placeholder", "prefix", "suffix", "heading", "description"];

/// payload 里的标量按目标类型转换：计数、布尔、文本；无法转换的删除，交给默认值
fn coerce_payload_scalars(map: &mut Map<String, Value>) {
    coerce_scalars(map);
    for section in ["config", "validation"] {
        match map.get_mut(section) {
            Some(Value::Object(inner)) => {
                coerce_scalars(inner);
                coerce_flag(inner, "required");
                for texts in ["labels", "placeholders"] {
                    match inner.get_mut(texts) {
                        Some(Value::Object(fields)) => {
                            let keys: Vec<String> = fields.keys().cloned().collect();
                            for key in keys {
                                coerce_text(fields, &key);
                            }
                        }
                        Some(_) => {
                            inner.remove(texts);
                        }
                        None => {}
                    }
                }
                for list in ["items", "acceptedTypes"] {
                    coerce_text_list(inner, list);
                }
            }
            Some(_) => {
                map.remove(section);
            }
            None => {}
        }
    }
}

fn coerce_scalars(map: &mut Map<String, Value>) {
    for key in COUNT_KEYS {
        let Some(value) = map.get(key) else {
            continue;
        };
        let limit = if key == "maxFileSize" {
            u64::MAX
        } else {
            u32::MAX.into()
        };
        if value.as_u64().is_some_and(|n| n <= limit) {
            continue;
        }
        match as_count(value) {
            Some(n) => {
                map.insert(key.to_string(), Value::from(n.min(limit)));
            }
            None => {
                map.remove(key);
            }
        }
    }
    for key in TEXT_KEYS {
        coerce_text(map, key);
    }
}

/// 非负整数；字符串可带 KB / MB / GB 单位（按 1024 进制换算为字节）
fn as_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase().replace(',', "");
            let split = lowered
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(lowered.len());
            let (number, unit) = lowered.split_at(split);
            let number: f64 = number.parse().ok()?;
            let scale: f64 = match unit.trim() {
                "" | "b" | "bytes" => 1.0,
                "k" | "kb" => 1024.0,
                "m" | "mb" => 1024.0 * 1024.0,
                "g" | "gb" => 1024.0 * 1024.0 * 1024.0,
                _ => return None,
            };
            Some((number * scale).round() as u64)
        }
        _ => None,
    }
}

/// "true" / "yes" / "1" 之类的布尔写法
fn as_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "required" => Some(true),
            "false" | "no" | "n" | "0" | "optional" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_flag(map: &mut Map<String, Value>, key: &str) {
    match map.get(key) {
        None | Some(Value::Bool(_)) => {}
        Some(value) => match as_flag(value) {
            Some(flag) => {
                map.insert(key.to_string(), Value::Bool(flag));
            }
            None => {
                map.remove(key);
            }
        },
    }
}

/// 字符串列表：数字转字符串，其它元素丢弃；单个字符串按逗号拆分
fn coerce_text_list(map: &mut Map<String, Value>, key: &str) {
    let list: Vec<Value> = match map.get(key) {
        None => return,
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => return,
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Number(n) => Some(Value::String(n.to_string())),
                _ => None,
            })
            .collect(),
        Some(Value::String(text)) => text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Value::String(t.to_string()))
            .collect(),
        Some(_) => Vec::new(),
    };
    map.insert(key.to_string(), Value::Array(list));
}

fn rename_if_absent(map: &mut Map<String, Value>, from: &str, to: &str) {
    if map.contains_key(to) {
        return;
    }
    if let Some(v) = map.remove(from) {
        map.insert(to.to_string(), v);
    }
}

/// 数字转字符串，其它非字符串值删除（交给默认值与 enforcer）
fn coerce_text(map: &mut Map<String, Value>, key: &str) {
    match map.get(key) {
        Some(Value::String(_)) | None => {}
        Some(Value::Number(n)) => {
            let s = n.to_string();
            map.insert(key.to_string(), Value::String(s));
        }
        Some(_) => {
            map.remove(key);
        }
    }
}

fn random_id(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..8])
}

fn ensure_id(map: &mut Map<String, Value>, prefix: &str) {
    let id = match map.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => return,
        Some(Value::Number(n)) => n.to_string(),
        _ => random_id(prefix),
    };
    map.insert("id".into(), Value::String(id));
}

/// 类型别名映射；缺少类型时有选项推断为 tiles，否则 textbox
fn resolve_type(map: &Map<String, Value>) -> Option<StepType> {
    let Some(raw) = map.get("type").and_then(Value::as_str) else {
        let has_options = map.contains_key("options") || map.contains_key("choices");
        return Some(if has_options {
            StepType::Tiles
        } else {
            StepType::Textbox
        });
    };
    if let Some(t) = StepType::from_wire(raw) {
        return Some(t);
    }
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let t = match key.as_str() {
        "tiles" | "tile" | "radio" | "cards" | "card" | "singleselect" | "singlechoice"
        | "choice" => StepType::Tiles,
        "multiselect" | "checkbox" | "checkboxes" | "multiplechoice" | "multi" => {
            StepType::MultiSelect
        }
        "dropdown" | "select" => StepType::Dropdown,
        "slider" | "range" => StepType::Slider,
        "followup" => StepType::Followup,
        "textbox" | "text" | "textarea" | "input" | "longtext" | "shorttext" => {
            StepType::Textbox
        }
        "location" | "address" => StepType::Location,
        "documentupload" | "upload" | "file" | "fileupload" => StepType::DocumentUpload,
        "documentinfo" | "info" => StepType::DocumentInfo,
        "contact" | "contactinfo" => StepType::Contact,
        _ => return None,
    };
    Some(t)
}

/// 选项：value→id、label→title，字符串选项升格为对象，规范为 {id, title, description, icon[, emoji]}
fn normalize_options(map: &mut Map<String, Value>) {
    rename_if_absent(map, "choices", "options");
    let options = match map.remove("options") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let canonical: Vec<Value> = options.into_iter().filter_map(canonical_option).collect();
    map.insert("options".into(), Value::Array(canonical));
}

fn canonical_option(option: Value) -> Option<Value> {
    let mut source = match option {
        Value::String(title) => {
            let mut m = Map::new();
            m.insert("title".into(), Value::String(title));
            m
        }
        Value::Number(n) => {
            let mut m = Map::new();
            m.insert("title".into(), Value::String(n.to_string()));
            m
        }
        Value::Object(m) => m,
        _ => return None,
    };

    rename_if_absent(&mut source, "value", "id");
    rename_if_absent(&mut source, "label", "title");
    rename_if_absent(&mut source, "text", "title");
    coerce_text(&mut source, "title");
    ensure_id(&mut source, "opt");

    let text = |key: &str| {
        source
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let mut out = Map::new();
    out.insert("id".into(), Value::String(text("id")));
    out.insert("title".into(), Value::String(text("title")));
    out.insert("description".into(), Value::String(text("description")));
    out.insert("icon".into(), Value::String(text("icon")));
    if let Some(emoji) = source.get("emoji").and_then(Value::as_str) {
        out.insert("emoji".into(), Value::String(emoji.to_string()));
    }
    Some(Value::Object(out))
}

fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    match entry {
        Value::Object(m) => m,
        _ => unreachable!("entry was just replaced by an object"),
    }
}

/// 顶层裸 `required` 迁移到 validation.required
fn migrate_required(map: &mut Map<String, Value>) {
    if let Some(required) = map.remove("required") {
        let validation = object_entry(map, "validation");
        if !validation.contains_key("required") {
            let flag = as_flag(&required).unwrap_or(true);
            validation.insert("required".into(), Value::Bool(flag));
        }
    }
}

fn normalize_location(map: &mut Map<String, Value>) {
    let config = object_entry(map, "config");
    if !config.get("labels").is_some_and(Value::is_object) {
        let labels = serde_json::to_value(LocationLabels::default()).unwrap_or(Value::Null);
        config.insert("labels".into(), labels);
    }
    migrate_required(map);
    let validation = object_entry(map, "validation");
    validation
        .entry("required".to_string())
        .or_insert(Value::Bool(true));
}

/// 数字或可解析的数字字符串
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
}

fn normalize_slider(map: &mut Map<String, Value>) {
    map.remove("required");
    map.remove("validation");
    rename_if_absent(map, "default", "defaultValue");

    for (key, fallback) in [("min", 0.0), ("max", 100.0), ("step", 1.0), ("defaultValue", 50.0)] {
        let value = map.get(key).and_then(as_number).unwrap_or(fallback);
        let number = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(fallback));
        // 原值已是数字时保持原样，避免 10 与 10.0 来回改写
        if !map.get(key).is_some_and(Value::is_number) {
            map.insert(key.to_string(), number);
        }
    }
}

/// contact 字段的规范键
fn contact_key(raw: &str) -> Option<&'static str> {
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "firstname" | "first" | "givenname" | "name" | "fullname" => Some("firstName"),
        "lastname" | "last" | "surname" | "familyname" => Some("lastName"),
        "email" | "mail" | "emailaddress" => Some("email"),
        "phone" | "tel" | "telephone" | "mobile" | "phonenumber" => Some("phone"),
        _ => None,
    }
}

/// 旧形状的 contact 字段描述：(规范键, label, placeholder)
fn legacy_contact_fields(map: &mut Map<String, Value>) -> Vec<(&'static str, Value)> {
    let mut found = Vec::new();

    if let Some(Value::Array(fields)) = map.remove("fields") {
        for field in fields {
            let name = ["name", "type", "id"]
                .iter()
                .find_map(|k| field.get(*k).and_then(Value::as_str))
                .and_then(contact_key);
            if let Some(key) = name {
                found.push((key, field));
            }
        }
    }

    for legacy in ["name", "firstName", "lastName", "email", "phone"] {
        if let Some(value) = map.remove(legacy) {
            if let Some(key) = contact_key(legacy) {
                found.push((key, value));
            }
        }
    }
    found
}

fn normalize_contact(map: &mut Map<String, Value>) {
    let legacy = legacy_contact_fields(map);

    let config = object_entry(map, "config");
    for (section, defaults) in [
        ("labels", ContactFields::default_labels()),
        ("placeholders", ContactFields::default_placeholders()),
    ] {
        let target = object_entry(config, section);
        let source_key = if section == "labels" { "label" } else { "placeholder" };

        for (key, value) in &legacy {
            let text = match value {
                Value::Object(_) => value.get(source_key).and_then(Value::as_str),
                Value::String(s) if section == "labels" => Some(s.as_str()),
                _ => None,
            };
            if let Some(text) = text {
                target
                    .entry((*key).to_string())
                    .or_insert_with(|| Value::String(text.to_string()));
            }
        }

        let defaults = serde_json::to_value(defaults).unwrap_or(Value::Null);
        if let Value::Object(defaults) = defaults {
            for (key, value) in defaults {
                if !target.get(&key).is_some_and(Value::is_string) {
                    target.insert(key, value);
                }
            }
        }
    }
}

fn normalize_document_upload(map: &mut Map<String, Value>) {
    map.remove("required");
    coerce_text_list(object_entry(map, "config"), "acceptedTypes");
    // 上传步骤约定可跳过
    let validation = object_entry(map, "validation");
    validation.insert("required".into(), Value::Bool(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::StepKind;
    use serde_json::json;

    fn normalized(step: Value) -> Value {
        let mut s = step;
        normalize_step(&mut s);
        s
    }

    #[test]
    fn test_label_and_question_become_title() {
        let s = normalized(json!({"type": "textbox", "label": "Name?"}));
        assert_eq!(s["title"], "Name?");
        assert!(s.get("label").is_none());

        let s = normalized(json!({"type": "textbox", "question": "Why?"}));
        assert_eq!(s["title"], "Why?");

        let s = normalized(json!({"type": "textbox", "title": "Keep", "label": "Other"}));
        assert_eq!(s["title"], "Keep");
    }

    #[test]
    fn test_subtitle_from_field_then_description() {
        let s = normalized(json!({"type": "tiles", "title": "T", "field": "service"}));
        assert_eq!(s["subtitle"], "Please select your service");

        let s = normalized(json!({"type": "tiles", "title": "T", "description": "Pick one"}));
        assert_eq!(s["subtitle"], "Pick one");
    }

    #[test]
    fn test_option_alternate_keys() {
        let s = normalized(json!({
            "type": "tiles",
            "title": "T",
            "options": [
                {"value": "a", "label": "Alpha"},
                "Beta",
                {"title": "Gamma", "id": 3, "icon": "star", "emoji": "⭐"}
            ]
        }));
        let opts = s["options"].as_array().unwrap();
        assert_eq!(opts[0], json!({"id": "a", "title": "Alpha", "description": "", "icon": ""}));
        assert_eq!(opts[1]["title"], "Beta");
        assert!(opts[1]["id"].as_str().unwrap().starts_with("opt-"));
        assert_eq!(opts[2]["id"], "3");
        assert_eq!(opts[2]["emoji"], "⭐");
    }

    #[test]
    fn test_type_aliases_and_inference() {
        assert_eq!(normalized(json!({"type": "checkbox"}))["type"], "multiSelect");
        assert_eq!(normalized(json!({"type": "multi_select"}))["type"], "multiSelect");
        assert_eq!(normalized(json!({"type": "Text Area"}))["type"], "textbox");
        assert_eq!(normalized(json!({"options": ["a"]}))["type"], "tiles");
        assert_eq!(normalized(json!({"title": "x"}))["type"], "textbox");
        assert_eq!(normalized(json!({"type": "hologram"}))["type"], "hologram");
    }

    #[test]
    fn test_location_defaults_and_required_migration() {
        let s = normalized(json!({"type": "location", "title": "Where", "required": false}));
        assert_eq!(s["config"]["labels"]["city"], "City");
        assert_eq!(s["validation"]["required"], false);
        assert!(s.get("required").is_none());
    }

    #[test]
    fn test_slider_backfill_and_strip_required() {
        let s = normalized(json!({
            "type": "slider", "title": "Budget", "required": true, "max": "5,000", "default": 10
        }));
        assert!(s.get("required").is_none());
        assert_eq!(s["min"], 0.0);
        assert_eq!(s["max"], 5000.0);
        assert_eq!(s["step"], 1.0);
        assert_eq!(s["defaultValue"], 10);
    }

    #[test]
    fn test_contact_legacy_fields_array() {
        let s = normalized(json!({
            "type": "contact",
            "title": "Contact",
            "fields": [
                {"name": "email", "label": "Work email", "placeholder": "you@corp.com"},
                {"type": "tel", "label": "Mobile"}
            ]
        }));
        assert!(s.get("fields").is_none());
        assert_eq!(s["config"]["labels"]["email"], "Work email");
        assert_eq!(s["config"]["placeholders"]["email"], "you@corp.com");
        assert_eq!(s["config"]["labels"]["phone"], "Mobile");
        assert_eq!(s["config"]["placeholders"]["phone"], "(555) 123-4567");
        assert_eq!(s["config"]["labels"]["firstName"], "First name");
    }

    #[test]
    fn test_contact_bare_sub_objects() {
        let s = normalized(json!({
            "type": "contact",
            "title": "Contact",
            "name": {"label": "Your name", "placeholder": "Jane"},
            "email": {"label": "E-mail"},
            "phone": {"placeholder": "555"}
        }));
        for legacy in ["name", "email", "phone"] {
            assert!(s.get(legacy).is_none(), "{legacy} should be removed");
        }
        assert_eq!(s["config"]["labels"]["firstName"], "Your name");
        assert_eq!(s["config"]["placeholders"]["firstName"], "Jane");
        assert_eq!(s["config"]["labels"]["email"], "E-mail");
        assert_eq!(s["config"]["placeholders"]["phone"], "555");
        assert_eq!(s["config"]["labels"]["lastName"], "Last name");
    }

    #[test]
    fn test_document_upload_is_skippable() {
        let s = normalized(json!({
            "type": "upload", "title": "Docs", "required": true,
            "config": {"acceptedTypes": ".pdf, .png"}
        }));
        assert_eq!(s["type"], "documentUpload");
        assert_eq!(s["validation"]["required"], false);
        assert_eq!(s["config"]["acceptedTypes"], json!([".pdf", ".png"]));
    }

    #[test]
    fn test_into_specification_drops_unknown_steps() {
        let root = json!({
            "steps": [
                {"type": "textbox", "title": "A"},
                {"type": "hologram", "title": "B"},
                {"type": "contact", "title": "C"}
            ],
            "ui": "not an object"
        });
        let out = into_specification(root);
        assert_eq!(out.dropped_steps, 1);
        assert_eq!(out.spec.steps.len(), 2);
        assert!(matches!(out.spec.steps[1].kind, StepKind::Contact(_)));
        assert_eq!(out.spec.ui, UiText::default());
    }

    #[test]
    fn test_idempotent_on_canonical_step() {
        let once = normalized(json!({
            "type": "contact",
            "title": "Contact",
            "fields": [{"name": "email", "label": "Mail"}]
        }));
        let twice = normalized(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let s = normalized(json!({
            "type": "dropdown", "title": "When", "placeholder": null,
            "options": [{"title": "Soon", "emoji": null}, null]
        }));
        assert!(s.get("placeholder").is_none());
        assert_eq!(s["options"].as_array().unwrap().len(), 1);

        let s = normalized(json!({
            "type": "location", "title": "Where",
            "config": {"labels": {"address": "Street", "city": null}},
            "validation": {"required": null}
        }));
        assert_eq!(s["config"]["labels"], json!({"address": "Street"}));
        assert_eq!(s["validation"]["required"], true);
    }

    #[test]
    fn test_numeric_strings_become_counts() {
        let s = normalized(json!({"type": "followup", "title": "More", "rows": "4"}));
        assert_eq!(s["rows"], 4);

        let s = normalized(json!({
            "type": "textbox", "title": "Notes", "rows": 5.0,
            "validation": {"minLength": "10"}
        }));
        assert_eq!(s["rows"], 5);
        assert_eq!(s["validation"]["minLength"], 10);

        let s = normalized(json!({"type": "textbox", "title": "Notes", "rows": "a few"}));
        assert!(s.get("rows").is_none());
    }

    #[test]
    fn test_file_size_units() {
        let s = normalized(json!({
            "type": "documentUpload", "title": "Docs",
            "config": {"maxFileSize": "10MB", "acceptedTypes": [".pdf", 7, null]}
        }));
        assert_eq!(s["config"]["maxFileSize"], 10 * 1024 * 1024);
        assert_eq!(s["config"]["acceptedTypes"], json!([".pdf", "7"]));

        let s = normalized(json!({"type": "upload", "title": "Docs", "config": {"maxFileSize": "2.5 kb"}}));
        assert_eq!(s["config"]["maxFileSize"], 2560);
    }

    #[test]
    fn test_required_flag_spellings() {
        let s = normalized(json!({"type": "textbox", "title": "A", "validation": {"required": "true"}}));
        assert_eq!(s["validation"]["required"], true);
        let s = normalized(json!({"type": "textbox", "title": "B", "required": "no"}));
        assert_eq!(s["validation"]["required"], false);
        let s = normalized(json!({"type": "location", "title": "C", "validation": {"required": 0}}));
        assert_eq!(s["validation"]["required"], false);
        let s = normalized(json!({"type": "textbox", "title": "D", "validation": "required"}));
        assert!(s.get("validation").is_none());
    }

    #[test]
    fn test_near_miss_steps_survive_conversion() {
        let root = json!({
            "steps": [
                {"type": "dropdown", "title": "When", "placeholder": null,
                 "options": ["Soon", "Later", "Whenever"]},
                {"type": "followup", "title": "More", "rows": "4"},
                {"type": "textbox", "title": "Notes", "validation": {"required": "true"}},
                {"type": "location", "title": "Where", "config": {"labels": {"city": null}}},
                {"type": "documentUpload", "title": "Docs", "config": {"maxFileSize": "10MB"}}
            ]
        });
        let out = into_specification(root);
        assert_eq!(out.dropped_steps, 0);
        assert_eq!(out.spec.steps.len(), 5);

        let kinds: Vec<&StepKind> = out.spec.steps.iter().map(|s| &s.kind).collect();
        match kinds[0] {
            StepKind::Dropdown(d) => assert_eq!(d.placeholder, crate::form::DropdownStep::default().placeholder),
            other => panic!("Expected dropdown, got {other:?}"),
        }
        match kinds[1] {
            StepKind::Followup(f) => assert_eq!(f.rows, 4),
            other => panic!("Expected followup, got {other:?}"),
        }
        match kinds[2] {
            StepKind::Textbox(t) => assert!(t.validation.required),
            other => panic!("Expected textbox, got {other:?}"),
        }
        match kinds[3] {
            StepKind::Location(l) => assert_eq!(l.config.labels.city, "City"),
            other => panic!("Expected location, got {other:?}"),
        }
        match kinds[4] {
            StepKind::DocumentUpload(u) => assert_eq!(u.config.max_file_size, 10 * 1024 * 1024),
            other => panic!("Expected documentUpload, got {other:?}"),
        }
    }

    #[test]
    fn test_has_steps() {
        assert!(has_steps(&json!({"steps": [{}]})));
        assert!(!has_steps(&json!({"steps": []})));
        assert!(!has_steps(&json!({"questions": [{}]})));
        assert!(!has_steps(&json!([1, 2])));
    }
}
