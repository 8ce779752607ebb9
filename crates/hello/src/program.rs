use crate::console::Console;
use crate::port::UartPort;
use crate::target::Target;

/// Print the banner and greeting, then send EOT.
///
/// `build_tag` stands in for the build date in the banner line.
pub fn greet<P: UartPort, T: Target>(console: &mut Console<P, T>, build_tag: &str) {
    console.write_bytes(b"\n");
    console.write_bytes(b"Light52 project -- ");
    console.write_bytes(build_tag.as_bytes());
    console.write_bytes(b"\n\n");
    console.write_bytes(b"Hello World!\n");

    console.end_transmission();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::NewlinePolicy;
    use crate::target::{Hardware, Simulation};
    use crate::EOT;

    #[derive(Default)]
    struct Sink(Vec<u8>);

    impl UartPort for Sink {
        fn write_data(&mut self, byte: u8) {
            self.0.push(byte);
        }

        fn tx_ready(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn test_greeting_bytes() {
        let mut console = Console::<_, Simulation>::new(Sink::default());
        greet(&mut console, "Oct 16 2026");
        let out = console.into_inner().0;

        let mut expected = b"\r\nLight52 project -- Oct 16 2026\r\n\r\nHello World!\r\n".to_vec();
        expected.push(EOT);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_ends_with_single_eot() {
        let mut console = Console::<_, Hardware>::new(Sink::default());
        greet(&mut console, "dev");
        let out = console.into_inner().0;
        assert_eq!(out.last(), Some(&EOT));
        assert_eq!(out.iter().filter(|&&b| b == EOT).count(), 1);
    }

    #[test]
    fn test_legacy_wire_order() {
        let mut console =
            Console::<_, Simulation>::new(Sink::default()).with_newline(NewlinePolicy::LfCr);
        greet(&mut console, "x");
        let out = console.into_inner().0;
        assert!(out.starts_with(b"\n\rLight52 project -- x\n\r\n\rHello World!\n\r"));
    }

    #[test]
    fn test_build_tag_is_expanded_like_the_rest() {
        let mut console = Console::<_, Simulation>::new(Sink::default());
        greet(&mut console, "rc1\nlab");
        let out = console.into_inner().0;
        assert!(out.starts_with(b"\r\nLight52 project -- rc1\r\nlab\r\n\r\n"));
    }
}
