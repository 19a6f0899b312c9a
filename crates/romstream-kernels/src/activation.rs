//! Activations on quantized values.

/// `max(x, 0)` element-wise.
pub fn relu_i8<const N: usize>(input: &[i8; N], output: &mut [i8; N]) {
    for (out, &x) in output.iter_mut().zip(input) {
        *out = x.max(0);
    }
}

/// `max(x, 0)` in place.
pub fn relu_i8_in_place(values: &mut [i8]) {
    for x in values {
        *x = (*x).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negatives_become_zero() {
        let mut out = [9i8; 5];
        relu_i8(&[-128, -1, 0, 1, 127], &mut out);
        assert_eq!(out, [0, 0, 0, 1, 127]);
    }

    #[test]
    fn in_place_matches_copying_form() {
        let input = [-3i8, 4, -5, 6];
        let mut copied = [0i8; 4];
        relu_i8(&input, &mut copied);
        let mut inplace = input;
        relu_i8_in_place(&mut inplace);
        assert_eq!(copied, inplace);
    }
}
