//! The stage-by-stage diagnostic bundle. The recorder is a pure observer: it
//! clones data the funnel already holds and never does work of its own, so a
//! disabled recorder costs nothing and an enabled one cannot change results.

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, RecommendationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Debug {
	pub total_in_db: u32,
	pub after_filter: u32,
	pub sample_restaurants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Debug {
	pub query_text: String,
	pub total_scored: u32,
	pub top_by_vector: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step3Debug {
	pub total_reranked: u32,
	pub top_by_rerank: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step4Debug {
	#[serde(rename = "candidatesSentToLLM")]
	pub candidates_sent_to_llm: Vec<Candidate>,
	pub final_recommendations: Vec<RecommendationResult>,
}

/// One bundle per funnel invocation. Later steps stay `None` when the funnel
/// short-circuits or fails before reaching them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDebugBundle {
	pub step1: Step1Debug,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub step2: Option<Step2Debug>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub step3: Option<Step3Debug>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub step4: Option<Step4Debug>,
}

#[derive(Debug)]
pub(crate) struct DebugRecorder {
	enabled: bool,
	sample_size: usize,
	step1: Option<Step1Debug>,
	step2: Option<Step2Debug>,
	step3: Option<Step3Debug>,
	step4: Option<Step4Debug>,
}
impl DebugRecorder {
	pub(crate) fn new(enabled: bool, sample_size: usize) -> Self {
		Self { enabled, sample_size, step1: None, step2: None, step3: None, step4: None }
	}

	pub(crate) fn record_filter(&mut self, total_in_db: usize, candidates: &[Candidate]) {
		if !self.enabled {
			return;
		}

		self.step1 = Some(Step1Debug {
			total_in_db: total_in_db as u32,
			after_filter: candidates.len() as u32,
			sample_restaurants: candidates
				.iter()
				.take(self.sample_size)
				.map(|candidate| candidate.name.clone())
				.collect(),
		});
	}

	pub(crate) fn record_vector(
		&mut self,
		query_text: &str,
		total_scored: usize,
		top_by_vector: &[Candidate],
	) {
		if !self.enabled {
			return;
		}

		self.step2 = Some(Step2Debug {
			query_text: query_text.to_string(),
			total_scored: total_scored as u32,
			top_by_vector: top_by_vector.to_vec(),
		});
	}

	pub(crate) fn record_rerank(&mut self, top_by_rerank: &[Candidate]) {
		if !self.enabled {
			return;
		}

		self.step3 = Some(Step3Debug {
			total_reranked: top_by_rerank.len() as u32,
			top_by_rerank: top_by_rerank.to_vec(),
		});
	}

	pub(crate) fn record_select(
		&mut self,
		sent: &[Candidate],
		final_recommendations: &[RecommendationResult],
	) {
		if !self.enabled {
			return;
		}

		self.step4 = Some(Step4Debug {
			candidates_sent_to_llm: sent.to_vec(),
			final_recommendations: final_recommendations.to_vec(),
		});
	}

	/// Consumes the recorder. `None` when recording is disabled or the
	/// funnel never completed its first stage.
	pub(crate) fn finish(self) -> Option<PipelineDebugBundle> {
		let step1 = self.step1?;

		Some(PipelineDebugBundle { step1, step2: self.step2, step3: self.step3, step4: self.step4 })
	}
}
