//! 模板渲染
//!
//! 提供 `{{variable}}` 占位符替换。未提供的变量渲染为空字符串，
//! 渲染本身不会失败。
//!
//! 花括号内除 `{`、`}` 外的任意内容都视为变量名，首尾空白会被去掉，
//! 因此 `{{ name }}` 与 `{{name}}` 等价；`{{customer.name}}` 按字面键 `customer.name` 查找。
//!
//! ## 使用示例
//!
//! ```ignore
//! let renderer = TemplateRenderer::new();
//! let mut variables = HashMap::new();
//! variables.insert("customerName".to_string(), json!("Ada"));
//!
//! let rendered = renderer.render("Hello {{customerName}}", &variables);
//! // 输出: "Hello Ada"
//! ```

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde_json::Value;

use super::types::RenderedMessage;

/// 模板渲染器
///
/// 无状态，可在多个任务间共享
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    /// 变量匹配正则
    variable_regex: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            // 匹配 {{ variable }}，变量名不能为空白
            variable_regex: Regex::new(r"\{\{\s*([^{}\s][^{}]*?)\s*\}\}")
                .expect("模板变量正则必须合法"),
        }
    }

    /// 渲染模板
    ///
    /// 将所有 `{{key}}` 替换为 `variables[key]` 的字符串形式，缺失的变量替换为空串
    pub fn render(&self, template: &str, variables: &HashMap<String, Value>) -> String {
        self.variable_regex
            .replace_all(template, |caps: &regex::Captures| {
                variables.get(&caps[1]).map(value_to_string).unwrap_or_default()
            })
            .into_owned()
    }

    /// 同时渲染标题和正文
    pub fn render_message(
        &self,
        subject: &str,
        body: &str,
        variables: &HashMap<String, Value>,
    ) -> RenderedMessage {
        RenderedMessage {
            subject: self.render(subject, variables),
            body: self.render(body, variables),
        }
    }

    /// 提取模板中引用的全部变量名（去重、有序）
    pub fn extract_variable_names(&self, template: &str) -> BTreeSet<String> {
        self.variable_regex
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// 模板引用了但变量表中没有的变量名，供模板预览使用
    pub fn missing_variables(
        &self,
        template: &str,
        variables: &HashMap<String, Value>,
    ) -> BTreeSet<String> {
        self.extract_variable_names(template)
            .into_iter()
            .filter(|name| !variables.contains_key(name))
            .collect()
    }
}

/// 变量值转字符串
///
/// 字符串原样输出，null 输出空串，数值和布尔使用 JSON 文本
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_render_simple() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("name", json!("Ada"))]);

        assert_eq!(renderer.render("Hello {{name}}", &variables), "Hello Ada");
    }

    #[test]
    fn test_render_missing_variable_is_blank() {
        let renderer = TemplateRenderer::new();

        assert_eq!(renderer.render("Hello {{name}}", &HashMap::new()), "Hello ");
    }

    #[test]
    fn test_render_no_placeholders_unchanged() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("name", json!("Ada")), ("unused", json!(1))]);
        let template = "Plain text with { braces } and }} stray {{ tokens";

        assert_eq!(renderer.render(template, &variables), template);
        assert_eq!(renderer.render(template, &HashMap::new()), template);
    }

    #[test]
    fn test_render_repeated_and_typed_values() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[
            ("name", json!("Ada")),
            ("interval", json!(365)),
            ("vip", json!(true)),
            ("note", Value::Null),
        ]);

        let result = renderer.render(
            "{{name}}/{{name}} every {{interval}} days vip={{vip}} note={{note}}",
            &variables,
        );
        assert_eq!(result, "Ada/Ada every 365 days vip=true note=");
    }

    #[test]
    fn test_render_spaced_and_dotted_names() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("customer.name", json!("Ada")), ("name", json!("Bob"))]);

        assert_eq!(
            renderer.render("Hi {{customer.name}} {{ name }}", &variables),
            "Hi Ada Bob"
        );
        assert_eq!(
            renderer.render("Hi {{customer.name}} {{ name }}", &HashMap::new()),
            "Hi  "
        );
        assert_eq!(renderer.render("empty {{ }} token", &HashMap::new()), "empty {{ }} token");

        let names = renderer.extract_variable_names("{{customer.name}} {{ name }} {{name}}");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["customer.name".to_string(), "name".to_string()]
        );
    }

    #[test]
    fn test_render_message() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("product", json!("Boiler")), ("dueDate", json!("2026-11-01"))]);

        let message = renderer.render_message(
            "{{product}} due",
            "Your {{product}} is due on {{dueDate}}.",
            &variables,
        );
        assert_eq!(message.subject, "Boiler due");
        assert_eq!(message.body, "Your Boiler is due on 2026-11-01.");
    }

    #[test]
    fn test_extract_variable_names() {
        let renderer = TemplateRenderer::new();
        let names = renderer
            .extract_variable_names("Dear {{customerName}}, {{product}} due {{dueDate}}. {{customerName}}");

        assert_eq!(names.len(), 3);
        assert!(names.contains("customerName"));
        assert!(names.contains("product"));
        assert!(names.contains("dueDate"));
    }

    #[test]
    fn test_missing_variables() {
        let renderer = TemplateRenderer::new();
        let variables = vars(&[("product", json!("Boiler"))]);

        let missing = renderer.missing_variables("{{product}} {{customerName}} {{companyName}}", &variables);
        assert_eq!(
            missing.into_iter().collect::<Vec<_>>(),
            vec!["companyName".to_string(), "customerName".to_string()]
        );
    }
}
