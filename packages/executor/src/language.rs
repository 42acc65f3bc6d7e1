/// Map a contest language identifier to the runtime name the execution
/// service understands. Unknown identifiers pass through lower-cased.
pub fn runtime_for(language: &str) -> String {
    let language = language.trim().to_lowercase();
    let runtime = match language.as_str() {
        "python" | "python3" | "py" => "python3",
        "js" | "javascript" | "node" => "javascript",
        "cpp" | "c++" => "cpp",
        "c" => "c",
        "java" => "java",
        _ => return language,
    };
    runtime.to_string()
}
