//! Utility macros shared by the instruction handlers.

/// Fails the instruction if the current frame is static.
#[macro_export]
macro_rules! require_non_staticcall {
    ($ctx:expr) => {
        if $ctx.interpreter.is_static {
            $ctx.interpreter
                .halt($crate::InstructionResult::StateChangeDuringStaticCall);
            return;
        }
    };
}

/// Fails the instruction if the hardfork is older than `$min`.
#[macro_export]
macro_rules! check {
    ($ctx:expr, $min:ident) => {
        if !$ctx
            .interpreter
            .spec
            .is_enabled_in(primitives::SpecId::$min)
        {
            $ctx.interpreter.halt($crate::InstructionResult::NotActivated);
            return;
        }
    };
}

/// Records a dynamic gas cost, halting with out-of-gas on overdraft.
#[macro_export]
macro_rules! gas {
    ($ctx:expr, $gas:expr) => {
        $crate::gas!($ctx, $gas, ())
    };
    ($ctx:expr, $gas:expr, $ret:expr) => {
        if !$ctx.interpreter.gas.record_cost($gas) {
            $ctx.interpreter.halt_oog();
            return $ret;
        }
    };
}

/// Records a computed gas cost that may overflow, halting on overflow or
/// overdraft.
#[macro_export]
macro_rules! gas_or_fail {
    ($ctx:expr, $gas:expr) => {
        $crate::gas_or_fail!($ctx, $gas, ())
    };
    ($ctx:expr, $gas:expr, $ret:expr) => {
        match $gas {
            Some(cost) => $crate::gas!($ctx, cost, $ret),
            None => {
                $ctx.interpreter
                    .halt($crate::InstructionResult::InvalidOperandOOG);
                return $ret;
            }
        }
    };
}

/// Records a refund.
#[macro_export]
macro_rules! refund {
    ($ctx:expr, $refund:expr) => {
        $ctx.interpreter.gas.record_refund($refund)
    };
}

/// Pops n values from the stack. Depth was validated at block entry.
#[macro_export]
macro_rules! popn {
    ([ $($x:ident),* ], $ctx:expr) => {
        // SAFETY: block-entry validation guarantees the depth.
        let [$( $x ),*] = unsafe { $ctx.interpreter.stack.popn() };
    };
}

/// Pops n values and binds a mutable reference to the new top.
#[macro_export]
macro_rules! popn_top {
    ([ $($x:ident),* ], $top:ident, $ctx:expr) => {
        // SAFETY: block-entry validation guarantees the depth.
        let ([$( $x ),*], $top) = unsafe { $ctx.interpreter.stack.popn_top() };
    };
}

/// Pushes a value. Capacity was validated at block entry.
#[macro_export]
macro_rules! push {
    ($ctx:expr, $value:expr) => {
        $ctx.interpreter.stack.push_unchecked($value)
    };
}

/// Resizes the frame memory, charging expansion gas.
#[macro_export]
macro_rules! resize_memory {
    ($ctx:expr, $offset:expr, $len:expr) => {
        $crate::resize_memory!($ctx, $offset, $len, ())
    };
    ($ctx:expr, $offset:expr, $len:expr, $ret:expr) => {
        if let Err(result) = $crate::memory::resize_memory(
            &mut $ctx.interpreter.gas,
            $ctx.memory,
            $offset,
            $len,
        ) {
            $ctx.interpreter.halt(result);
            return $ret;
        }
    };
}

/// Converts a `U256` to `usize`, halting when it does not fit.
#[macro_export]
macro_rules! as_usize_or_fail {
    ($ctx:expr, $value:expr) => {
        $crate::as_usize_or_fail!($ctx, $value, ())
    };
    ($ctx:expr, $value:expr, $ret:expr) => {
        match usize::try_from($value) {
            Ok(value) => value,
            Err(_) => {
                $ctx.interpreter
                    .halt($crate::InstructionResult::InvalidOperandOOG);
                return $ret;
            }
        }
    };
}

/// Converts a `U256` to `usize`, saturating at `usize::MAX`.
#[macro_export]
macro_rules! as_usize_saturated {
    ($value:expr) => {
        usize::try_from($value).unwrap_or(usize::MAX)
    };
}
