//! Shared test utilities for domain testing
//!
//! This crate provides reusable test fixtures for the tokenizer and
//! embeddings crates:
//! - `TestDataBuilder`: Deterministic test data generation
//! - `fixtures`: Sample sentences in English and nine other scripts
//! - `assertions`: Custom assertion helpers
//!
//! # Usage
//!
//! ```rust
//! use test_utils::{TestDataBuilder, fixtures};
//!
//! let builder = TestDataBuilder::from_test_name("my_test");
//! let corpus = builder.corpus(50);
//! assert_eq!(corpus.len(), 50);
//!
//! for sample in fixtures::MULTILINGUAL {
//!     assert!(!sample.original.is_empty());
//! }
//! ```

use std::path::PathBuf;

use uuid::Uuid;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// This is the recommended way to create a builder for consistent test data.
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_round_trip");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministic correlation id derived from the seed and an index
    pub fn correlation_id(&self, index: u64) -> Uuid {
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        uuid_bytes[8..16].copy_from_slice(&index.to_le_bytes());
        Uuid::from_bytes(uuid_bytes)
    }

    /// Generate `count` sentences by mixing the fixture texts.
    ///
    /// The same seed always yields the same sentences in the same order.
    pub fn corpus(&self, count: usize) -> Vec<String> {
        let pool: Vec<&str> = fixtures::SAMPLE_TEXTS
            .iter()
            .copied()
            .chain(fixtures::MULTILINGUAL.iter().map(|s| s.original))
            .collect();

        let mut state = self.seed | 1;
        (0..count)
            .map(|_| {
                // xorshift64
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                pool[(state % pool.len() as u64) as usize].to_string()
            })
            .collect()
    }

    /// A unique scratch path under the system temp directory.
    ///
    /// The directory is not created.
    pub fn scratch_path(&self, file_name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("polydb-test-{}-{}", self.seed, Uuid::new_v4()))
            .join(file_name)
    }
}

/// Sample texts used across tokenizer and API tests
pub mod fixtures {
    pub struct MultilingualSample {
        pub language: &'static str,
        pub original: &'static str,
        pub query: &'static str,
    }

    pub const SAMPLE_TEXTS: &[&str] = &[
        "The quick brown fox jumps over the lazy dog",
        "Machine learning is a subset of artificial intelligence",
        "Vector databases are optimized for similarity search operations",
        "Python is a powerful programming language with simple syntax",
        "Natural language processing helps computers understand human language",
        "Embeddings represent text as high-dimensional vectors",
        "The Transformer architecture revolutionized NLP tasks",
        "Data structures are essential for efficient algorithms",
        "Distributed systems enable horizontal scaling of applications",
        "Cloud computing provides on-demand computing resources",
    ];

    pub const MULTILINGUAL: &[MultilingualSample] = &[
        MultilingualSample {
            language: "English",
            original: "Machine learning enables computers to learn from data and improve over time",
            query: "computers learning from data",
        },
        MultilingualSample {
            language: "Hebrew",
            original: "למידת מכונה מאפשרת למחשבים ללמוד מנתונים ולהשתפר עם הזמן",
            query: "מחשבים לומדים מנתונים",
        },
        MultilingualSample {
            language: "Bengali",
            original: "মেশিন লার্নিং কম্পিউটারগুলিকে ডেটা থেকে শিখতে এবং সময়ের সাথে উন্নত করতে সক্ষম করে",
            query: "কম্পিউটার ডেটা থেকে শেখা",
        },
        MultilingualSample {
            language: "Vietnamese",
            original: "Học máy cho phép máy tính học từ dữ liệu và cải thiện theo thời gian",
            query: "máy tính học từ dữ liệu",
        },
        MultilingualSample {
            language: "Korean",
            original: "머신 러닝은 컴퓨터가 데이터에서 학습하고 시간이 지남에 따라 개선되도록 합니다",
            query: "컴퓨터 데이터 학습",
        },
        MultilingualSample {
            language: "Arabic",
            original: "يتيح التعلم الآلي للحواسيب التعلم من البيانات والتحسن بمرور الوقت",
            query: "الحواسيب تتعلم من البيانات",
        },
        MultilingualSample {
            language: "Russian",
            original: "Машинное обучение позволяет компьютерам учиться на данных и улучшаться со временем",
            query: "компьютеры учатся на данных",
        },
        MultilingualSample {
            language: "Thai",
            original: "การเรียนรู้ของเครื่องช่วยให้คอมพิวเตอร์เรียนรู้จากข้อมูลและปรับปรุงเมื่อเวลาผ่านไป",
            query: "คอมพิวเตอร์เรียนรู้จากข้อมูล",
        },
        MultilingualSample {
            language: "Chinese",
            original: "机器学习使计算机能够从数据中学习并随着时间推移而改进",
            query: "计算机从数据中学习",
        },
        MultilingualSample {
            language: "Japanese",
            original: "機械学習により、コンピューターはデータから学習し、時間とともに改善することができます",
            query: "コンピューターがデータから学習する",
        },
    ];
}

/// Test assertion helpers
pub mod assertions {
    use std::collections::HashSet;

    /// Assert that a sequence never grows from one step to the next
    pub fn assert_non_increasing(values: &[usize], context: &str) {
        for window in values.windows(2) {
            assert!(
                window[1] <= window[0],
                "{}: sequence increased from {} to {}",
                context,
                window[0],
                window[1]
            );
        }
    }

    /// Assert that every character of `text` appears in `corpus`
    pub fn assert_covered_by(text: &str, corpus: &[String], context: &str) {
        let seen: HashSet<char> = corpus.iter().flat_map(|s| s.chars()).collect();
        if let Some(missing) = text.chars().find(|c| !seen.contains(c)) {
            panic!("{}: character {:?} never appears in the corpus", context, missing);
        }
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
