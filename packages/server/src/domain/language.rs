//! 言語カタログ
//!
//! エディタで選べる言語と、サンドボックスで実行する際のランタイムバージョン、
//! 保存時の拡張子、言語切り替え時にバッファを戻すボイラープレートを定義します。
//! Room のスナップショットとライブセッションは同じカタログからボイラープレートを引きます。

use super::entity::DEFAULT_CODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    pub id: &'static str,
    /// サンドボックスに要求するランタイムバージョン
    pub version: &'static str,
    pub extension: &'static str,
    pub boilerplate: &'static str,
}

pub const LANGUAGES: [LanguageSpec; 6] = [
    LanguageSpec {
        id: "javascript",
        version: "18.15.0",
        extension: "js",
        boilerplate: DEFAULT_CODE,
    },
    LanguageSpec {
        id: "typescript",
        version: "5.0.3",
        extension: "ts",
        boilerplate: "// Write your TypeScript code here\nconst message: string = \"Hello, World!\";\nconsole.log(message);\n",
    },
    LanguageSpec {
        id: "python",
        version: "3.10.0",
        extension: "py",
        boilerplate: "# Write your Python code here\nprint(\"Hello, World!\")\n",
    },
    LanguageSpec {
        id: "java",
        version: "15.0.2",
        extension: "java",
        boilerplate: "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}\n",
    },
    LanguageSpec {
        id: "csharp",
        version: "6.12.0",
        extension: "cs",
        boilerplate: "using System;\n\nclass Program {\n    static void Main() {\n        Console.WriteLine(\"Hello, World!\");\n    }\n}\n",
    },
    LanguageSpec {
        id: "php",
        version: "8.2.3",
        extension: "php",
        boilerplate: "<?php\n// Write your PHP code here\necho \"Hello, World!\";\n",
    },
];

pub fn find(id: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES.iter().find(|spec| spec.id == id)
}

pub fn boilerplate(id: &str) -> Option<&'static str> {
    find(id).map(|spec| spec.boilerplate)
}

/// `{name}.{extension}`（未知の言語では `name` のまま）
pub fn file_name(name: &str, language: &str) -> String {
    match find(language) {
        Some(spec) => format!("{}.{}", name, spec.extension),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_language() {
        // テスト項目: 既知の言語のバージョンと拡張子が引ける
        // given (前提条件):
        let id = "python";

        // when (操作):
        let spec = find(id).unwrap();

        // then (期待する結果):
        assert_eq!(spec.version, "3.10.0");
        assert_eq!(spec.extension, "py");
        assert!(find("cobol").is_none());
    }

    #[test]
    fn test_javascript_boilerplate_matches_new_room() {
        // テスト項目: javascript のボイラープレートは新規 Room のコードと同じ
        // given (前提条件) / when (操作):
        let code = boilerplate("javascript");

        // then (期待する結果):
        assert_eq!(code, Some(DEFAULT_CODE));
    }

    #[test]
    fn test_file_name_uses_extension() {
        // テスト項目: 保存時のファイル名に拡張子が付く
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(file_name("main", "python"), "main.py");
        assert_eq!(file_name("Main", "csharp"), "Main.cs");
        assert_eq!(file_name("notes", "markdown"), "notes");
    }
}
