use featuremap::FeatureMap;
use inference_engine::{EngineLimits, InferenceEngine};
use sstruct::{Nucleotide, Sequence, SStruct};

pub fn sequence_from_str(s: &str) -> Sequence {
    Sequence::new(s.chars().map(|c| Nucleotide::try_from(c).unwrap()).collect())
}

pub fn sstruct_from_str(s: &str) -> SStruct {
    SStruct::new(sequence_from_str(s))
}

/// A freshly loaded engine with a zeroed default parameter vector, large
/// enough to cover every feature class the default `FeatureConfig` enables.
pub fn default_engine(example: &SStruct) -> InferenceEngine {
    let mut engine = InferenceEngine::new(false, EngineLimits::default());
    engine.load_sequence(example).expect("fixture sequences always clear the minimum hairpin length");
    engine.load_values(FeatureMap::default(), vec![0.0; 8192], None).expect("the zero vector always satisfies the length check");
    engine
}

/// Parses a dot-bracket string (`.`, `(`, `)`) into a 1-based pair mapping.
pub fn parens_to_mapping(parens: &str) -> Vec<usize> {
    let mut mapping = vec![0usize; parens.len() + 1];
    let mut stack = Vec::new();
    for (idx, c) in parens.chars().enumerate() {
        let i = idx + 1;
        match c {
            '(' => stack.push(i),
            ')' => {
                let j = stack.pop().expect("balanced test fixture");
                mapping[i] = j;
                mapping[j] = i;
            }
            _ => {}
        }
    }
    mapping
}
