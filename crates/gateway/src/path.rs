//! # ストレージキーの構築と検証
//!
//! バケットプレフィックス、ユーザーID、ユーザー指定パスから
//! `<bucketPrefix>/<identity>/<userPath>` 形式のキーを構築する。
//! ユーザー間のワークスペース分離はこの関数だけが担保する。

use crate::error::StorageError;

/// キーに含めてはならない文字（シェル/HTML上で危険な文字）
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', '|', '`', '\'', '"', '$', '!', '#', '&', '*', '(', ')', '\\', '[', ']', '{', '}',
    ';', '~',
];

/// 検証済みのストレージキー。
///
/// `make_storage_key` 以外から構築されることはない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `key` の先頭からこのキーを取り除いた相対キーを返す。一致しなければ `key` のまま。
    pub fn relative<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.0.as_str()).unwrap_or(key)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// バケットプレフィックス、ユーザーID、ユーザー指定パスからストレージキーを構築する。
///
/// - `identity` が空、または `/` を含む場合は `InvalidIdentity`
/// - 構築後のキーが `//`、`..`、`.` セグメント、禁止文字を含む場合は `InvalidPath`
///
/// 純粋関数。I/Oを行わない。
pub fn make_storage_key(
    bucket_prefix: &str,
    identity: &str,
    user_path: &str,
) -> Result<StorageKey, StorageError> {
    if identity.is_empty() || identity.contains('/') {
        return Err(StorageError::InvalidIdentity(identity.to_string()));
    }

    let mut key = String::with_capacity(bucket_prefix.len() + identity.len() + user_path.len() + 2);
    key.push_str(bucket_prefix);
    if !bucket_prefix.is_empty() && !bucket_prefix.ends_with('/') {
        key.push('/');
    }
    key.push_str(identity);
    if !user_path.starts_with('/') {
        key.push('/');
    }
    key.push_str(user_path);

    if !is_safe_key(&key) {
        return Err(StorageError::InvalidPath(user_path.to_string()));
    }
    Ok(StorageKey(key))
}

fn is_safe_key(key: &str) -> bool {
    if key.contains("//") || key.contains("..") || key.contains(FORBIDDEN_CHARS) {
        return false;
    }
    !key.split('/').any(|segment| segment == ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PREFIX: &str = "goTestPrefix";
    const TEST_USER: &str = "goTestUser";

    /// 先頭スラッシュの有無にかかわらず同じキーになることを確認
    #[test]
    fn test_make_storage_key_valid_paths() {
        let cases = [
            ("/whatever/whatever", "whatever/whatever"),
            ("/whatever/whatever/", "whatever/whatever/"),
            ("whatever/whatever", "whatever/whatever"),
            ("", ""),
            ("a-b_c.d/e.tar.gz", "a-b_c.d/e.tar.gz"),
        ];
        for (input, expected) in cases {
            let key = make_storage_key(TEST_PREFIX, TEST_USER, input)
                .unwrap_or_else(|e| panic!("{input:?} が検証に失敗: {e}"));
            assert_eq!(key.as_str(), format!("{TEST_PREFIX}/{TEST_USER}/{expected}"));
        }
    }

    /// トラバーサルや禁止文字を含むパスが拒否されることを確認
    #[test]
    fn test_make_storage_key_rejects_unsafe_paths() {
        let cases = [
            "frick//jack",
            "frick/../jack",
            "..",
            "frick/./jack",
            "./jack",
            "frick/.",
            ".",
            "//",
            "a..b",
            "`echo hello` > /etc/passwd",
        ];
        for input in cases {
            let result = make_storage_key(TEST_PREFIX, TEST_USER, input);
            assert!(
                matches!(result, Err(StorageError::InvalidPath(_))),
                "{input:?} は拒否されるべき"
            );
        }
    }

    /// 禁止文字集合の各文字が単独で拒否されることを確認
    #[test]
    fn test_make_storage_key_rejects_each_forbidden_char() {
        for c in FORBIDDEN_CHARS {
            let input = format!("dir/file{c}name");
            let result = make_storage_key(TEST_PREFIX, TEST_USER, &input);
            assert!(
                matches!(result, Err(StorageError::InvalidPath(_))),
                "{c:?} を含むパスは拒否されるべき"
            );
        }
    }

    /// 空のIDや `/` を含むIDが拒否されることを確認
    #[test]
    fn test_make_storage_key_rejects_invalid_identity() {
        for identity in ["", "a/b", "/", "alice/"] {
            let result = make_storage_key(TEST_PREFIX, identity, "x.txt");
            assert!(
                matches!(result, Err(StorageError::InvalidIdentity(_))),
                "{identity:?} は拒否されるべき"
            );
        }
    }

    /// バケットプレフィックスの末尾スラッシュ有無と空プレフィックスを確認
    #[test]
    fn test_make_storage_key_bucket_prefix_forms() {
        let key = make_storage_key("team/test", "alice", "x.txt").unwrap();
        assert_eq!(key.as_str(), "team/test/alice/x.txt");

        let key = make_storage_key("team/test/", "alice", "x.txt").unwrap();
        assert_eq!(key.as_str(), "team/test/alice/x.txt");

        let key = make_storage_key("", "alice", "x.txt").unwrap();
        assert_eq!(key.as_str(), "alice/x.txt");

        let root = make_storage_key("team/test", "alice", "").unwrap();
        assert_eq!(root.as_str(), "team/test/alice/");
    }

    /// バケットプレフィックス側の二重スラッシュも拒否されることを確認
    #[test]
    fn test_make_storage_key_rejects_doubled_prefix_separator() {
        let result = make_storage_key("team//test", "alice", "x.txt");
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    /// 同一パスに対して異なるIDが同じキーを生成しないことを確認
    #[test]
    fn test_make_storage_key_is_injective_across_identities() {
        let identities = ["alice", "bob", "alice2", "a", "ali", "ce", "alice.bob", "alice-bob"];
        let paths = ["", "x.txt", "/x.txt", "docs/report.pdf", "ce/x.txt"];
        for path in paths {
            let mut seen = std::collections::HashSet::new();
            for identity in identities {
                let key = make_storage_key("team", identity, path).unwrap();
                assert!(key.as_str().starts_with(&format!("team/{identity}/")));
                assert!(seen.insert(key), "{identity:?} と {path:?} のキーが衝突");
            }
        }
    }

    /// ワークスペースルートの除去がプレフィックス一致時のみ行われることを確認
    #[test]
    fn test_storage_key_relative() {
        let root = make_storage_key("team", "alice", "").unwrap();
        assert_eq!(root.relative("team/alice/docs/x.txt"), "docs/x.txt");
        assert_eq!(root.relative("team/bob/x.txt"), "team/bob/x.txt");
    }

    mod properties {
        use proptest::prelude::*;

        use super::super::*;

        /// ドットを含まないユーザーID
        fn identity() -> impl Strategy<Value = String> {
            "[A-Za-z0-9_-]{1,16}"
        }

        /// 安全なセグメント。ドットは空でない部分の間に1つだけ
        fn segment() -> impl Strategy<Value = String> {
            "[A-Za-z0-9_-]{1,8}(\\.[A-Za-z0-9_-]{1,4})?"
        }

        /// 安全なパス（空可、先頭・末尾スラッシュ任意）
        fn safe_path() -> impl Strategy<Value = String> {
            (prop::collection::vec(segment(), 0..5), any::<bool>(), any::<bool>()).prop_map(
                |(segments, leading, trailing)| {
                    let mut path = segments.join("/");
                    if trailing && !path.is_empty() {
                        path.push('/');
                    }
                    if leading {
                        path.insert(0, '/');
                    }
                    path
                },
            )
        }

        fn non_empty_path() -> impl Strategy<Value = String> {
            prop::collection::vec(segment(), 1..4).prop_map(|segments| segments.join("/"))
        }

        fn bucket_prefix() -> impl Strategy<Value = String> {
            (prop::collection::vec(segment(), 0..3), any::<bool>()).prop_map(
                |(segments, trailing)| {
                    let mut prefix = segments.join("/");
                    if trailing && !prefix.is_empty() {
                        prefix.push('/');
                    }
                    prefix
                },
            )
        }

        fn expected_root(prefix: &str, identity: &str) -> String {
            if prefix.is_empty() || prefix.ends_with('/') {
                format!("{prefix}{identity}/")
            } else {
                format!("{prefix}/{identity}/")
            }
        }

        proptest! {
            /// 安全なIDとパスは常に受理され、呼び出し元のルート配下に置かれる
            #[test]
            fn test_safe_inputs_are_accepted_under_own_root(
                prefix in bucket_prefix(),
                identity in identity(),
                path in safe_path()
            ) {
                let key = make_storage_key(&prefix, &identity, &path);
                prop_assert!(key.is_ok(), "{prefix:?} {identity:?} {path:?}: {key:?}");
                let key = key.unwrap();
                let root = expected_root(&prefix, &identity);
                prop_assert!(key.as_str().starts_with(&root), "{key} が {root} で始まらない");
                prop_assert_eq!(key.as_str(), format!("{root}{}", path.trim_start_matches('/')));
            }

            /// `..`、`.` セグメント、`//` を挟んだパスはIDにかかわらず拒否される
            #[test]
            fn test_traversal_constructs_are_rejected(
                prefix in bucket_prefix(),
                identity in identity(),
                left in non_empty_path(),
                right in non_empty_path(),
                bad in prop::sample::select(vec!["..", ".", ""]),
                leading in any::<bool>()
            ) {
                let path = if leading {
                    format!("/{bad}/{right}")
                } else {
                    format!("{left}/{bad}/{right}")
                };
                let result = make_storage_key(&prefix, &identity, &path);
                prop_assert!(
                    matches!(result, Err(StorageError::InvalidPath(_))),
                    "{path:?} は拒否されるべき: {result:?}"
                );
            }

            /// 禁止文字をパスのどこに含んでも拒否される
            #[test]
            fn test_forbidden_chars_are_rejected(
                prefix in bucket_prefix(),
                identity in identity(),
                left in safe_path(),
                right in safe_path(),
                c in prop::sample::select(FORBIDDEN_CHARS.to_vec())
            ) {
                let path = format!("{left}{c}{right}");
                let result = make_storage_key(&prefix, &identity, &path);
                prop_assert!(
                    matches!(result, Err(StorageError::InvalidPath(_))),
                    "{path:?} は拒否されるべき: {result:?}"
                );
            }

            /// 同一パスに対して異なるIDが同じキーを生成しない
            #[test]
            fn test_distinct_identities_never_collide(
                prefix in bucket_prefix(),
                a in identity(),
                b in identity(),
                path in safe_path()
            ) {
                prop_assume!(a != b);
                let key_a = make_storage_key(&prefix, &a, &path).unwrap();
                let key_b = make_storage_key(&prefix, &b, &path).unwrap();
                prop_assert_ne!(key_a, key_b);
            }
        }
    }
}
