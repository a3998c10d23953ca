use std::sync::{mpsc, Arc};

use threadpool::ThreadPool;

use super::subsampling::{ChromaSubsampler, SamplingSpec, SubsampleResult};
use super::YCbCrImage;
use crate::{error::Error, Result};

/// Outcome of subsampling one image with one scheme.
#[derive(Debug)]
pub struct SchemeReport {
    pub sampling_spec: SamplingSpec,
    pub result: SubsampleResult,
}

/// Runs several subsampling schemes over the same image in parallel.
pub struct SubsamplingTransformer<'a> {
    threadpool: &'a ThreadPool,
}

impl<'a> SubsamplingTransformer<'a> {
    pub fn new(threadpool: &'a ThreadPool) -> Self {
        SubsamplingTransformer { threadpool }
    }

    /// Returns one report per scheme, in the order of `sampling_specs`.
    pub fn transform(
        &self,
        image: &Arc<YCbCrImage>,
        sampling_specs: &[SamplingSpec],
    ) -> Result<Vec<SchemeReport>> {
        let (sender, receiver) = mpsc::channel();
        for (index, &sampling_spec) in sampling_specs.iter().enumerate() {
            let sender = sender.clone();
            let image = Arc::clone(image);
            self.threadpool.execute(move || {
                let result = ChromaSubsampler::new(&image, sampling_spec).subsample();
                // the receiver only hangs up after a failed scheme
                let _ = sender.send((index, result));
            });
        }
        drop(sender);

        let mut results: Vec<Option<SubsampleResult>> =
            sampling_specs.iter().map(|_| None).collect();
        for (index, result) in receiver.iter() {
            results[index] = Some(result?);
        }

        sampling_specs
            .iter()
            .zip(results)
            .map(|(&sampling_spec, result)| -> Result<SchemeReport> {
                let result = result.ok_or(Error::SubsamplingWorkerFailed(sampling_spec))?;
                log::info!("{} byte size: {}", sampling_spec, result.bytes());
                Ok(SchemeReport {
                    sampling_spec,
                    result,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use threadpool::ThreadPool;

    use super::SubsamplingTransformer;
    use crate::color::YCbCrColorFormat;
    use crate::image::subsampling::{subsample, ChromaSubsamplingPreset, SamplingSpec};
    use crate::image::{Image, YCbCrImage};

    fn create_test_image() -> YCbCrImage {
        let dots = (0..35_u8)
            .map(|v| YCbCrColorFormat::new(v, v.wrapping_mul(7), v.wrapping_mul(13)))
            .collect();
        Image::new(7, 5, dots).unwrap()
    }

    #[test]
    fn reports_keep_request_order() {
        let threadpool = ThreadPool::new(3);
        let transformer = SubsamplingTransformer::new(&threadpool);
        let image = Arc::new(create_test_image());
        let specs: Vec<SamplingSpec> = [
            ChromaSubsamplingPreset::P410,
            ChromaSubsamplingPreset::P444,
            ChromaSubsamplingPreset::P422,
            ChromaSubsamplingPreset::P420,
            ChromaSubsamplingPreset::P411,
        ]
        .iter()
        .map(ChromaSubsamplingPreset::sampling_spec)
        .collect();
        let reports = transformer.transform(&image, &specs).unwrap();
        assert_eq!(reports.len(), specs.len());
        for (report, spec) in reports.iter().zip(&specs) {
            assert_eq!(&report.sampling_spec, spec, "report order does not match");
        }
    }

    #[test]
    fn parallel_results_match_sequential_results() {
        let threadpool = ThreadPool::new(2);
        let transformer = SubsamplingTransformer::new(&threadpool);
        let image = Arc::new(create_test_image());
        let specs = [
            SamplingSpec::new(2, 0).unwrap(),
            SamplingSpec::new(1, 1).unwrap(),
        ];
        let reports = transformer.transform(&image, &specs).unwrap();
        for report in reports {
            let spec = report.sampling_spec;
            let expected = subsample(&image, spec.a(), spec.b()).unwrap();
            assert_eq!(report.result.bytes(), expected.bytes());
            assert_eq!(report.result.image(), expected.image());
        }
    }

    #[test]
    fn no_schemes() {
        let threadpool = ThreadPool::new(1);
        let transformer = SubsamplingTransformer::new(&threadpool);
        let reports = transformer
            .transform(&Arc::new(create_test_image()), &[])
            .unwrap();
        assert!(reports.is_empty());
    }
}
