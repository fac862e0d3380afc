//! Channel mixing (multichannel to mono)

use crate::error::ScreeningError;

/// Average interleaved multichannel audio into mono
///
/// # Arguments
///
/// * `interleaved` - Samples ordered frame by frame (`L R L R ...` for stereo)
/// * `channels` - Channel count
///
/// # Returns
///
/// One sample per frame, the mean across channels. A trailing partial frame
/// is dropped.
///
/// # Errors
///
/// Returns `InvalidInput` if `channels` is zero
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Result<Vec<f32>, ScreeningError> {
    if channels == 0 {
        return Err(ScreeningError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }
    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!(
        "Downmixing {} frames of {}-channel audio",
        interleaved.len() / channels,
        channels
    );

    let scale = 1.0 / channels as f32;
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_average() {
        let mono = downmix_interleaved(&[1.0, 0.0, 0.5, 0.5, -1.0, 1.0], 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mono_passthrough_and_partial_frame() {
        assert_eq!(downmix_interleaved(&[0.1, 0.2], 1).unwrap(), vec![0.1, 0.2]);
        assert_eq!(downmix_interleaved(&[0.3, 0.3, 0.3, 0.9], 3).unwrap().len(), 1);
        assert!(downmix_interleaved(&[0.0], 0).is_err());
    }
}
